//! 추세선 연장 예측.

use advisor_core::{
    AdvisorError, AdvisorResult, ConfidenceBand, MethodProjection, ProjectionConfig, ProjectionMethod,
};

use super::{floor_price, ProjectionContext, Projector};
use crate::stats;

/// 최근 종가의 최소제곱 추세선을 H일 연장합니다.
///
/// 신뢰 구간은 ± z × 잔차 표준오차 × 예측 구간 계수입니다.
#[derive(Debug, Clone)]
pub struct TrendProjector {
    lookback: usize,
    min_bars: usize,
    z: f64,
}

impl TrendProjector {
    pub fn new(config: &ProjectionConfig) -> Self {
        Self {
            lookback: config.trend_lookback,
            min_bars: config.trend_min_bars,
            z: config.band_z,
        }
    }
}

impl Projector for TrendProjector {
    fn method(&self) -> ProjectionMethod {
        ProjectionMethod::Trend
    }

    fn min_bars(&self) -> usize {
        self.min_bars
    }

    fn project(&self, ctx: &ProjectionContext<'_>) -> AdvisorResult<MethodProjection> {
        let n = ctx.closes.len();
        let window = &ctx.closes[n - self.lookback.min(n)..];
        let fit = stats::linear_regression(window)
            .ok_or_else(|| AdvisorError::insufficient("trend", self.min_bars, n))?;

        let current = ctx.current_price();
        let last_x = (window.len() - 1) as f64;
        let steps = ctx.horizon.steps();

        let path: Vec<f64> = (1..=steps)
            .map(|t| floor_price(fit.value_at(last_x + t as f64), current))
            .collect();
        let point = path.last().copied().unwrap_or(current);

        let target_x = last_x + steps as f64;
        let half = self.z * fit.residual_se * fit.prediction_factor(target_x);
        let band = ConfidenceBand::new(floor_price(point - half, current), point + half);

        Ok(MethodProjection::new(current, point, band, path))
    }
}
