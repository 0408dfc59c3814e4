//! 매매 추천 결과.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Price;

/// 매매 결정.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Buy,
    Sell,
    Hold,
}

impl Decision {
    /// 점수를 결정으로 변환합니다.
    ///
    /// `score >= buy_threshold` → Buy, `score <= sell_threshold` → Sell, 그 외 Hold.
    pub fn from_score(score: f64, buy_threshold: f64, sell_threshold: f64) -> Self {
        if score >= buy_threshold {
            Decision::Buy
        } else if score <= sell_threshold {
            Decision::Sell
        } else {
            Decision::Hold
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Buy => "BUY",
            Decision::Sell => "SELL",
            Decision::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// 추천 신뢰도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::High => "High",
        };
        f.write_str(s)
    }
}

/// 종합 점수 구성 요소.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// 기술적 지표와 패턴
    Technical,
    /// 외부 ML 예측
    Ml,
    /// 모멘텀
    Momentum,
    /// 리스크 (변동성, 레벨 근접도)
    Risk,
    /// 거래량
    Volume,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Component::Technical,
        Component::Ml,
        Component::Momentum,
        Component::Risk,
        Component::Volume,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Component::Technical => "technical",
            Component::Ml => "ml",
            Component::Momentum => "momentum",
            Component::Risk => "risk",
            Component::Volume => "volume",
        }
    }

    /// 한국어 이름 (근거 문장용).
    pub fn korean_name(&self) -> &'static str {
        match self {
            Component::Technical => "기술적 분석",
            Component::Ml => "ML 예측",
            Component::Momentum => "모멘텀",
            Component::Risk => "리스크",
            Component::Volume => "거래량",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 분석 호출마다 새로 생성되는 추천 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub label: Decision,
    pub confidence: ConfidenceLevel,
    /// 종합 점수 (0 ~ 100)
    pub overall_score: f64,
    /// 사용된 구성 요소 점수 (0 ~ 100)
    pub component_scores: BTreeMap<Component, f64>,
    /// 입력이 없어 제외된 구성 요소
    pub excluded_components: Vec<Component>,
    /// 재정규화된 가중치 (합계 1)
    pub weights_used: BTreeMap<Component, f64>,
    pub current_price: Price,
    pub target_price: Price,
    pub stop_loss: Price,
    /// |목표가 - 현재가| / |현재가 - 손절가| (클램핑하지 않음)
    pub risk_reward_ratio: f64,
    /// 목표가 기준 기대 수익률 (%)
    pub expected_return_pct: f64,
    pub horizon_days: u32,
    /// 추천 근거
    pub rationale: Vec<String>,
}

impl Recommendation {
    pub fn component_score(&self, component: Component) -> Option<f64> {
        self.component_scores.get(&component).copied()
    }

    /// 매수/매도처럼 행동을 요구하는 추천인지 (관망이 아닌지).
    pub fn is_actionable(&self) -> bool {
        self.label != Decision::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> Recommendation {
        Recommendation {
            label: Decision::Hold,
            confidence: ConfidenceLevel::Medium,
            overall_score: 50.0,
            component_scores: BTreeMap::new(),
            excluded_components: Vec::new(),
            weights_used: BTreeMap::new(),
            current_price: dec!(100),
            target_price: dec!(105),
            stop_loss: dec!(97),
            risk_reward_ratio: 5.0 / 3.0,
            expected_return_pct: 5.0,
            horizon_days: 10,
            rationale: Vec::new(),
        }
    }

    #[test]
    fn test_decision_thresholds() {
        assert_eq!(Decision::from_score(65.0, 65.0, 35.0), Decision::Buy);
        assert_eq!(Decision::from_score(64.99, 65.0, 35.0), Decision::Hold);
        assert_eq!(Decision::from_score(35.0, 65.0, 35.0), Decision::Sell);
        assert_eq!(Decision::from_score(35.01, 65.0, 35.0), Decision::Hold);
        assert_eq!(Decision::from_score(0.0, 65.0, 35.0), Decision::Sell);
    }

    #[test]
    fn test_actionable_excludes_hold() {
        let decisions = [Decision::Buy, Decision::Hold, Decision::Sell];
        let actionable: Vec<bool> = decisions
            .iter()
            .map(|label| Recommendation { label: *label, ..sample() }.is_actionable())
            .collect();
        assert_eq!(actionable, vec![true, false, true]);
    }

    #[test]
    fn test_component_serde() {
        let json = serde_json::to_string(&Component::Ml).unwrap();
        assert_eq!(json, "\"ml\"");
        assert_eq!(Component::ALL.len(), 5);
    }
}
