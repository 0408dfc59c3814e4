//! 몬테카를로 랜덤 워크 예측.
//!
//! 일간 로그 수익률 ~ N(평균 로그 수익률, σ²)로 N개의 경로를 시뮬레이션합니다.
//! σ는 연율화 변동성을 일간으로 되돌린 값이며 `min_daily_volatility` 이상입니다.
//! 같은 시드와 같은 입력은 항상 같은 결과를 냅니다.

use advisor_core::{
    AdvisorError, AdvisorResult, ConfidenceBand, MethodProjection, ProjectionConfig, ProjectionMethod,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::debug;

use super::{ProjectionContext, Projector};
use crate::stats;

/// 일간 로그 수익률 분포 N(drift, sigma²).
fn log_return_distribution(drift: f64, sigma: f64) -> AdvisorResult<Normal<f64>> {
    Normal::new(drift, sigma).map_err(|e| {
        AdvisorError::Calculation(format!(
            "로그 수익률 분포를 만들 수 없습니다 (drift={}, sigma={}): {}",
            drift, sigma, e
        ))
    })
}

#[derive(Debug, Clone)]
pub struct MonteCarloProjector {
    paths: usize,
    min_bars: usize,
    min_daily_volatility: f64,
    trading_days: f64,
}

impl MonteCarloProjector {
    pub fn new(config: &ProjectionConfig) -> Self {
        Self {
            paths: config.monte_carlo_paths.max(1),
            min_bars: config.monte_carlo_min_bars,
            min_daily_volatility: config.min_daily_volatility,
            trading_days: config.trading_days_per_year,
        }
    }

    /// 일간 변동성과 드리프트 (평균 로그 수익률).
    fn daily_parameters(&self, closes: &[f64]) -> (f64, f64) {
        let returns = stats::log_returns(closes);
        let annualized = stats::sample_std(&returns) * self.trading_days.sqrt();
        let daily = annualized / self.trading_days.sqrt();
        let sigma = if daily.is_finite() {
            daily.max(self.min_daily_volatility)
        } else {
            self.min_daily_volatility
        };
        (sigma, stats::mean(&returns))
    }
}

impl Projector for MonteCarloProjector {
    fn method(&self) -> ProjectionMethod {
        ProjectionMethod::MonteCarlo
    }

    fn min_bars(&self) -> usize {
        self.min_bars
    }

    fn project(&self, ctx: &ProjectionContext<'_>) -> AdvisorResult<MethodProjection> {
        let current = ctx.current_price();
        let (sigma, drift) = self.daily_parameters(ctx.closes);
        let steps = ctx.horizon.steps();

        let distribution = log_return_distribution(drift, sigma)?;
        let seed = ctx.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = StdRng::seed_from_u64(seed);

        let mut mean_path = vec![0.0; steps];
        let mut terminals = Vec::with_capacity(self.paths);
        for _ in 0..self.paths {
            let mut price = current;
            for slot in mean_path.iter_mut() {
                price *= distribution.sample(&mut rng).exp();
                *slot += price;
            }
            terminals.push(price);
        }

        let count = self.paths as f64;
        for slot in mean_path.iter_mut() {
            *slot /= count;
        }
        let point = stats::mean(&terminals);

        terminals.sort_by(|a, b| a.total_cmp(b));
        let p10 = stats::percentile(&terminals, 0.10);
        let p90 = stats::percentile(&terminals, 0.90);
        let band = ConfidenceBand::new(p10.min(point), p90.max(point));

        debug!(seed, sigma, drift, paths = self.paths, "몬테카를로 시뮬레이션 완료");

        Ok(MethodProjection::new(current, point, band, mean_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::{Horizon, StructureLevels};

    fn noisy(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 * (1.0 + 0.02 * ((i * 7 % 5) as f64 - 2.0) / 2.0))
            .collect()
    }

    fn run(closes: &[f64], days: u32, seed: Option<u64>) -> MethodProjection {
        let structure = StructureLevels::empty();
        let ctx = ProjectionContext {
            closes,
            structure: &structure,
            horizon: Horizon::new(days).unwrap(),
            seed,
        };
        MonteCarloProjector::new(&ProjectionConfig::default())
            .project(&ctx)
            .unwrap()
    }

    #[test]
    fn test_seed_reproducibility() {
        let closes = noisy(40);
        let a = run(&closes, 10, Some(42));
        let b = run(&closes, 10, Some(42));
        assert_eq!(a, b);

        let c = run(&closes, 10, Some(43));
        assert_ne!(a.projected_price, c.projected_price);
    }

    #[test]
    fn test_band_contains_point() {
        let closes = noisy(40);
        let result = run(&closes, 20, Some(1));
        assert!(result.band.contains(result.projected_price));
        assert!(result.band.width() > 0.0);
        assert_eq!(result.path.len(), 20);
        assert!(result.path.iter().all(|p| *p > 0.0));
    }

    #[test]
    fn test_flat_series_uses_volatility_floor() {
        let closes = vec![50.0; 30];
        let result = run(&closes, 5, Some(9));
        assert!(result.band.width() > 0.0);
        assert!(result.band.width() < 50.0 * 0.01);
        assert!((result.projected_price - 50.0).abs() < 0.05);
    }

    #[test]
    fn test_log_return_distribution() {
        let mut rng = StdRng::seed_from_u64(5);
        let distribution = log_return_distribution(0.001, 0.02).unwrap();
        let draws: Vec<f64> = (0..20_000).map(|_| distribution.sample(&mut rng)).collect();
        assert!((stats::mean(&draws) - 0.001).abs() < 0.001);
        assert!((stats::population_std(&draws) - 0.02).abs() < 0.001);

        assert!(matches!(
            log_return_distribution(0.0, f64::NAN).unwrap_err(),
            AdvisorError::Calculation(_)
        ));
    }
}
