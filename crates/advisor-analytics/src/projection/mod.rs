//! 다중 방법 가격 예측.
//!
//! 각 예측 방법은 [`Projector`] 트레이트를 구현하며, [`ProjectionEngine`]은
//! 활성화된 방법들의 결과를 모아 앙상블(단순 평균)을 만듭니다.
//!
//! # 예측 방법
//!
//! - **Trend**: 최근 종가의 최소제곱 추세선 연장
//! - **MovingAverage**: 단기/장기 이동평균 괴리의 기하급수적 수렴
//! - **SupportResistance**: 지지/저항 사이의 감쇠 진동
//! - **MonteCarlo**: 로그 정규 랜덤 워크 시뮬레이션 (시드 주입 가능)
//!
//! 이력이 부족한 방법은 결과의 `omitted`에 기록되고 앙상블에서 제외됩니다.

pub mod ensemble;
pub mod monte_carlo;
pub mod moving_average;
pub mod support_resistance;
pub mod trend;

use std::collections::BTreeMap;

use advisor_core::{
    AdvisorError, AdvisorResult, Horizon, MethodProjection, OmittedMethod, ProjectionConfig,
    ProjectionMethod, ProjectionResult, StructureLevels,
};
use tracing::{debug, warn};

pub use ensemble::ensemble;
pub use monte_carlo::MonteCarloProjector;
pub use moving_average::MovingAverageProjector;
pub use support_resistance::SupportResistanceProjector;
pub use trend::TrendProjector;

/// 예측 가격 하한 (현재가 대비 비율).
const PRICE_FLOOR_RATIO: f64 = 0.01;

/// 예측 가격이 0 이하로 내려가지 않도록 현재가의 1%에서 자릅니다.
pub(crate) fn floor_price(price: f64, current: f64) -> f64 {
    price.max(current * PRICE_FLOOR_RATIO)
}

/// 예측 방법에 전달되는 입력.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionContext<'a> {
    /// 종가 시계열 (오래된 순)
    pub closes: &'a [f64],
    pub structure: &'a StructureLevels,
    pub horizon: Horizon,
    /// 몬테카를로 시드. `None`이면 호출마다 새 시드를 사용합니다.
    pub seed: Option<u64>,
}

impl ProjectionContext<'_> {
    /// 현재가 (마지막 종가).
    pub fn current_price(&self) -> f64 {
        self.closes.last().copied().unwrap_or(0.0)
    }
}

/// 가격 예측 방법.
pub trait Projector: Send + Sync {
    /// 예측 방법 식별자.
    fn method(&self) -> ProjectionMethod;

    /// 필요한 최소 종가 개수.
    fn min_bars(&self) -> usize;

    /// H일 예측을 계산합니다.
    ///
    /// 방법 고유의 전제 조건이 충족되지 않으면 `InsufficientData`를 반환하며,
    /// 엔진은 이를 생략으로 처리합니다.
    fn project(&self, ctx: &ProjectionContext<'_>) -> AdvisorResult<MethodProjection>;
}

/// 예측 엔진.
pub struct ProjectionEngine {
    projectors: Vec<Box<dyn Projector>>,
}

impl std::fmt::Debug for ProjectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let methods: Vec<ProjectionMethod> = self.projectors.iter().map(|p| p.method()).collect();
        f.debug_struct("ProjectionEngine").field("projectors", &methods).finish()
    }
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(&ProjectionConfig::default(), advisor_core::StructureConfig::default().window)
    }
}

impl ProjectionEngine {
    /// 기본 네 가지 방법으로 엔진을 생성합니다.
    ///
    /// `structure_window`는 지지/저항 진동 주기(W/2)에 사용됩니다.
    pub fn new(config: &ProjectionConfig, structure_window: usize) -> Self {
        Self::with_projectors(vec![
            Box::new(TrendProjector::new(config)),
            Box::new(MovingAverageProjector::new(config)),
            Box::new(SupportResistanceProjector::new(config, structure_window)),
            Box::new(MonteCarloProjector::new(config)),
        ])
    }

    /// 지정한 방법들로 엔진을 생성합니다.
    pub fn with_projectors(projectors: Vec<Box<dyn Projector>>) -> Self {
        Self { projectors }
    }

    pub fn methods(&self) -> Vec<ProjectionMethod> {
        self.projectors.iter().map(|p| p.method()).collect()
    }

    /// 모든 방법을 실행하고 앙상블을 계산합니다.
    ///
    /// 적용 가능한 방법이 하나도 없으면 `InsufficientData`.
    pub fn project(
        &self,
        closes: &[f64],
        structure: &StructureLevels,
        horizon: Horizon,
        seed: Option<u64>,
    ) -> AdvisorResult<ProjectionResult> {
        let ctx = ProjectionContext {
            closes,
            structure,
            horizon,
            seed,
        };
        let current = ctx.current_price();
        if !(current.is_finite() && current > 0.0) {
            return Err(AdvisorError::MalformedSeries(
                "예측에 사용할 현재가가 없습니다".to_string(),
            ));
        }

        let mut methods = BTreeMap::new();
        let mut omitted = Vec::new();

        for projector in &self.projectors {
            let method = projector.method();
            if closes.len() < projector.min_bars() {
                let reason = format!(
                    "데이터 부족: 필요 {}개, 제공 {}개",
                    projector.min_bars(),
                    closes.len()
                );
                warn!(method = method.label(), %reason, "예측 방법 생략");
                omitted.push(OmittedMethod { method, reason });
                continue;
            }

            match projector.project(&ctx) {
                Ok(projection) => {
                    if !projection.projected_price.is_finite() {
                        return Err(AdvisorError::Calculation(format!(
                            "{} 예측값이 유한하지 않습니다",
                            method.label()
                        )));
                    }
                    debug!(
                        method = method.label(),
                        price = projection.projected_price,
                        low = projection.band.low,
                        high = projection.band.high,
                        "예측 완료"
                    );
                    methods.insert(method, projection);
                }
                Err(e) if e.is_insufficient_data() => {
                    warn!(method = method.label(), error = %e, "예측 방법 생략");
                    omitted.push(OmittedMethod {
                        method,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let ensemble = ensemble(current, methods.values()).ok_or_else(|| {
            let required = self.projectors.iter().map(|p| p.min_bars()).min().unwrap_or(0);
            AdvisorError::insufficient("projection", required, closes.len())
        })?;

        Ok(ProjectionResult {
            horizon,
            current_price: current,
            methods,
            ensemble,
            omitted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_engine_methods() {
        let engine = ProjectionEngine::default();
        assert_eq!(
            engine.methods(),
            vec![
                ProjectionMethod::Trend,
                ProjectionMethod::MovingAverage,
                ProjectionMethod::SupportResistance,
                ProjectionMethod::MonteCarlo,
            ]
        );
    }

    #[test]
    fn test_short_series_only_trend() {
        let engine = ProjectionEngine::default();
        let closes = [100.0, 102.0, 104.0, 106.0, 108.0, 110.0];
        let result = engine
            .project(&closes, &StructureLevels::empty(), Horizon::new(5).unwrap(), Some(7))
            .unwrap();

        assert_eq!(result.methods.len(), 1);
        assert!((result.get(ProjectionMethod::Trend).unwrap().projected_price - 120.0).abs() < 1e-9);
        assert!((result.ensemble.projected_price - 120.0).abs() < 1e-9);
        assert!(result.is_omitted(ProjectionMethod::MovingAverage));
        assert!(result.is_omitted(ProjectionMethod::SupportResistance));
        assert!(result.is_omitted(ProjectionMethod::MonteCarlo));
    }

    #[test]
    fn test_no_method_qualifies() {
        let engine = ProjectionEngine::default();
        let err = engine
            .project(&[100.0, 101.0], &StructureLevels::empty(), Horizon::new(3).unwrap(), None)
            .unwrap_err();
        assert!(err.is_insufficient_data());
    }
}
