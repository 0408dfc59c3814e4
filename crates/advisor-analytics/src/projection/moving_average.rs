//! 이동평균 수렴 예측.
//!
//! 단기 이동평균과 장기 이동평균의 괴리가 봉당 `1 / short` 비율로
//! 기하급수적으로 줄어든다고 가정합니다.
//!
//! `p(t) = 현재가 - 괴리 × (1 - (1 - 1/short)^t)`

use advisor_core::{AdvisorResult, ConfidenceBand, MethodProjection, ProjectionConfig, ProjectionMethod};

use super::{floor_price, ProjectionContext, Projector};
use crate::stats;

#[derive(Debug, Clone)]
pub struct MovingAverageProjector {
    short: usize,
    long: usize,
    z: f64,
}

impl MovingAverageProjector {
    pub fn new(config: &ProjectionConfig) -> Self {
        Self {
            short: config.ma_short,
            long: config.ma_long,
            z: config.band_z,
        }
    }
}

impl Projector for MovingAverageProjector {
    fn method(&self) -> ProjectionMethod {
        ProjectionMethod::MovingAverage
    }

    fn min_bars(&self) -> usize {
        self.long.max(self.short + 1)
    }

    fn project(&self, ctx: &ProjectionContext<'_>) -> AdvisorResult<MethodProjection> {
        let closes = ctx.closes;
        let n = closes.len();
        let current = ctx.current_price();

        let short_ma = stats::mean(&closes[n - self.short..]);
        let long_ma = stats::mean(&closes[n - self.long..]);
        let gap = short_ma - long_ma;
        let decay = 1.0 - 1.0 / self.short as f64;

        let steps = ctx.horizon.steps();
        let path: Vec<f64> = (1..=steps)
            .map(|t| floor_price(current - gap * (1.0 - decay.powi(t as i32)), current))
            .collect();
        let point = path.last().copied().unwrap_or(current);

        // 단기 윈도우의 일간 변화량 표준편차
        let changes: Vec<f64> = closes[n - self.short - 1..]
            .windows(2)
            .map(|w| w[1] - w[0])
            .collect();
        let sigma = stats::sample_std(&changes);
        let half = self.z * sigma * (steps as f64).sqrt();
        let band = ConfidenceBand::new(floor_price(point - half, current), point + half);

        Ok(MethodProjection::new(current, point, band, path))
    }
}
