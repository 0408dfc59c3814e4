//! 매매 추천 점수 산정.
//!
//! 기술적 지표, 차트 구조, 앙상블 예측, 외부 점수(ML/모멘텀/거래량)를
//! 가중 합산하여 Buy/Sell/Hold 추천과 목표가, 손절가, 손익비를 만듭니다.

mod rationale;
pub mod scorer;

use advisor_core::{AdvisorError, AdvisorResult, Component};
use serde::{Deserialize, Serialize};

pub use scorer::{RecommendationScorer, ScoringInput};

/// ML 예측 수익률 1당 점수 변화 (±20% 수익률 = 0 / 100점).
const ML_RETURN_SCALE: f64 = 250.0;

/// 외부 협력자가 제공하는 0 ~ 100 점수.
///
/// 값이 없는 구성 요소는 기본값으로 채우지 않고 종합 점수에서 제외됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalScores {
    pub ml: Option<f64>,
    pub momentum: Option<f64>,
    pub volume: Option<f64>,
}

impl ExternalScores {
    pub fn new(ml: Option<f64>, momentum: Option<f64>, volume: Option<f64>) -> Self {
        Self { ml, momentum, volume }
    }

    /// 외부 점수가 하나도 없는 입력.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_ml(mut self, score: f64) -> Self {
        self.ml = Some(score);
        self
    }

    pub fn with_momentum(mut self, score: f64) -> Self {
        self.momentum = Some(score);
        self
    }

    pub fn with_volume(mut self, score: f64) -> Self {
        self.volume = Some(score);
        self
    }

    /// 구성 요소별 외부 점수. 기술/리스크는 항상 `None`.
    pub fn get(&self, component: Component) -> Option<f64> {
        match component {
            Component::Ml => self.ml,
            Component::Momentum => self.momentum,
            Component::Volume => self.volume,
            Component::Technical | Component::Risk => None,
        }
    }

    /// 모든 점수가 유한하고 0 ~ 100 범위인지 확인합니다.
    pub fn validate(&self) -> AdvisorResult<()> {
        for component in [Component::Ml, Component::Momentum, Component::Volume] {
            if let Some(score) = self.get(component) {
                if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                    return Err(AdvisorError::InvalidParameter(format!(
                        "{} 점수는 0 ~ 100 범위여야 합니다: {}",
                        component.korean_name(),
                        score
                    )));
                }
            }
        }
        Ok(())
    }

    /// ML 수익률 예측을 점수로 변환합니다.
    ///
    /// `50 + 250 × 기대 수익률`을 신뢰도(0 ~ 1)만큼 50에서 벌린 뒤 0 ~ 100으로 자릅니다.
    /// 유한하지 않은 입력은 중립 50.
    pub fn ml_from_forecast(expected_return: f64, confidence: f64) -> f64 {
        if !expected_return.is_finite() || !confidence.is_finite() {
            return 50.0;
        }
        let raw = ML_RETURN_SCALE * expected_return;
        (50.0 + raw * confidence.clamp(0.0, 1.0)).clamp(0.0, 100.0)
    }
}
