//! 차트 구조: 지지/저항 레벨과 차트 패턴.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Price;

/// 레벨 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    /// 지지 (현재가 이하)
    Support,
    /// 저항 (현재가 초과)
    Resistance,
}

/// 지지/저항 레벨.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureLevel {
    /// 군집 평균 가격
    pub price: Price,
    pub kind: LevelKind,
    /// 터치 횟수
    pub strength: usize,
}

/// 패턴의 방향성.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternBias {
    Bullish,
    Bearish,
    Neutral,
}

impl PatternBias {
    /// 강세 +1, 약세 -1, 중립 0.
    pub fn sign(&self) -> f64 {
        match self {
            PatternBias::Bullish => 1.0,
            PatternBias::Bearish => -1.0,
            PatternBias::Neutral => 0.0,
        }
    }
}

/// 차트 패턴 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// 쌍봉 (하락 반전)
    DoubleTop,
    /// 쌍바닥 (상승 반전)
    DoubleBottom,
    /// 상승 삼각형
    AscendingTriangle,
    /// 하락 삼각형
    DescendingTriangle,
    /// 대칭 삼각형
    SymmetricalTriangle,
    /// 상승 깃발
    BullFlag,
    /// 하락 깃발
    BearFlag,
}

impl PatternKind {
    /// 패턴의 방향성.
    pub fn bias(&self) -> PatternBias {
        match self {
            PatternKind::DoubleBottom | PatternKind::AscendingTriangle | PatternKind::BullFlag => {
                PatternBias::Bullish
            }
            PatternKind::DoubleTop | PatternKind::DescendingTriangle | PatternKind::BearFlag => {
                PatternBias::Bearish
            }
            PatternKind::SymmetricalTriangle => PatternBias::Neutral,
        }
    }

    /// 한국어 표시 이름.
    pub fn label(&self) -> &'static str {
        match self {
            PatternKind::DoubleTop => "쌍봉",
            PatternKind::DoubleBottom => "쌍바닥",
            PatternKind::AscendingTriangle => "상승 삼각형",
            PatternKind::DescendingTriangle => "하락 삼각형",
            PatternKind::SymmetricalTriangle => "대칭 삼각형",
            PatternKind::BullFlag => "상승 깃발",
            PatternKind::BearFlag => "하락 깃발",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 감지된 차트 패턴.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPattern {
    pub kind: PatternKind,
    /// 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
    /// 패턴 시작 인덱스
    pub start_index: usize,
    /// 패턴 종료 인덱스
    pub end_index: usize,
}

impl ChartPattern {
    pub fn new(kind: PatternKind, confidence: f64, start_index: usize, end_index: usize) -> Self {
        Self {
            kind,
            confidence: confidence.clamp(0.0, 1.0),
            start_index,
            end_index,
        }
    }
}

/// 구조 감지 결과.
///
/// 레벨은 가격 오름차순으로 정렬됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureLevels {
    pub levels: Vec<StructureLevel>,
    pub patterns: Vec<ChartPattern>,
}

impl StructureLevels {
    /// 빈 결과 (데이터 부족 시).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty() && self.patterns.is_empty()
    }

    /// `price`보다 엄격히 낮은 레벨 중 가장 가까운 것.
    pub fn nearest_support(&self, price: Price) -> Option<&StructureLevel> {
        self.levels
            .iter()
            .filter(|l| l.price < price)
            .max_by(|a, b| a.price.cmp(&b.price))
    }

    /// `price`보다 엄격히 높은 레벨 중 가장 가까운 것.
    pub fn nearest_resistance(&self, price: Price) -> Option<&StructureLevel> {
        self.levels
            .iter()
            .filter(|l| l.price > price)
            .min_by(|a, b| a.price.cmp(&b.price))
    }

    pub fn supports(&self) -> impl Iterator<Item = &StructureLevel> {
        self.levels.iter().filter(|l| l.kind == LevelKind::Support)
    }

    pub fn resistances(&self) -> impl Iterator<Item = &StructureLevel> {
        self.levels
            .iter()
            .filter(|l| l.kind == LevelKind::Resistance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn level(price: Price, kind: LevelKind) -> StructureLevel {
        StructureLevel {
            price,
            kind,
            strength: 2,
        }
    }

    #[test]
    fn test_nearest_levels() {
        let structure = StructureLevels {
            levels: vec![
                level(dec!(90), LevelKind::Support),
                level(dec!(95), LevelKind::Support),
                level(dec!(105), LevelKind::Resistance),
                level(dec!(120), LevelKind::Resistance),
            ],
            patterns: vec![],
        };

        assert_eq!(structure.nearest_support(dec!(100)).unwrap().price, dec!(95));
        assert_eq!(structure.nearest_resistance(dec!(100)).unwrap().price, dec!(105));
        assert!(structure.nearest_support(dec!(90)).is_none());
        assert!(structure.nearest_resistance(dec!(120)).is_none());
        assert_eq!(structure.supports().count(), 2);
    }

    #[test]
    fn test_pattern_bias_and_clamp() {
        assert_eq!(PatternKind::DoubleTop.bias(), PatternBias::Bearish);
        assert_eq!(PatternKind::BullFlag.bias(), PatternBias::Bullish);
        assert_eq!(PatternKind::SymmetricalTriangle.bias(), PatternBias::Neutral);

        let p = ChartPattern::new(PatternKind::DoubleBottom, 1.7, 3, 10);
        assert_eq!(p.confidence, 1.0);
    }

    #[test]
    fn test_empty() {
        assert!(StructureLevels::empty().is_empty());
    }
}
