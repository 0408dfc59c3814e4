//! 지지/저항 진동 예측.
//!
//! 현재가 아래의 가장 가까운 지지선과 위의 가장 가까운 저항선 사이에서
//! 터치 횟수로 가중한 중심을 향해 감쇠 진동한다고 가정합니다.

use std::f64::consts::PI;

use advisor_core::{
    price_from_f64, AdvisorError, AdvisorResult, ConfidenceBand, DecimalExt, MethodProjection,
    ProjectionConfig, ProjectionMethod,
};

use super::{ProjectionContext, Projector};

#[derive(Debug, Clone)]
pub struct SupportResistanceProjector {
    damping: f64,
    window: usize,
}

impl SupportResistanceProjector {
    /// `window`는 구조 감지 윈도우 W이며, 진동 반주기는 W/2입니다.
    pub fn new(config: &ProjectionConfig, window: usize) -> Self {
        Self {
            damping: config.oscillation_damping,
            window: window.max(2),
        }
    }
}

impl Projector for SupportResistanceProjector {
    fn method(&self) -> ProjectionMethod {
        ProjectionMethod::SupportResistance
    }

    /// 구조 감지와 같은 2 × W.
    fn min_bars(&self) -> usize {
        2 * self.window
    }

    fn project(&self, ctx: &ProjectionContext<'_>) -> AdvisorResult<MethodProjection> {
        let current = ctx.current_price();
        let current_dec = price_from_f64(current)
            .ok_or_else(|| AdvisorError::Calculation("현재가를 변환할 수 없습니다".to_string()))?;

        let support = ctx.structure.nearest_support(current_dec);
        let resistance = ctx.structure.nearest_resistance(current_dec);
        let (support, resistance) = match (support, resistance) {
            (Some(s), Some(r)) => (s, r),
            (s, r) => {
                let found = usize::from(s.is_some()) + usize::from(r.is_some());
                return Err(AdvisorError::insufficient("support/resistance levels", 2, found));
            }
        };

        let low = support.price.as_f64();
        let high = resistance.price.as_f64();
        let ws = support.strength.max(1) as f64;
        let wr = resistance.strength.max(1) as f64;
        let anchor = (low * ws + high * wr) / (ws + wr);

        let half_period = (self.window / 2).max(1) as f64;
        let steps = ctx.horizon.steps();
        let path: Vec<f64> = (1..=steps)
            .map(|t| {
                let t = t as f64;
                let swing = (current - anchor) * self.damping.powf(t) * (PI * t / half_period).cos();
                (anchor + swing).clamp(low, high)
            })
            .collect();
        let point = path.last().copied().unwrap_or(current);

        Ok(MethodProjection::new(
            current,
            point,
            ConfidenceBand::new(low, high),
            path,
        ))
    }
}
