//! 차트 구조 감지.
//!
//! 국소 극값을 군집화하여 지지/저항 레벨을 만들고, 최근 극값과 가격 흐름에서
//! 쌍봉/쌍바닥, 삼각형, 깃발 패턴을 찾습니다.
//!
//! 2 × W개 미만의 봉에서는 오류 대신 빈 결과를 반환합니다.

pub mod levels;
pub mod patterns;

use advisor_core::{DecimalExt, PatternKind, PriceSeries, StructureConfig, StructureLevels};
use tracing::debug;

pub use levels::{cluster_levels, find_extrema, Extremum};

/// 지지/저항 및 패턴 감지기.
#[derive(Debug, Clone, Default)]
pub struct StructureDetector {
    config: StructureConfig,
}

impl StructureDetector {
    pub fn new(config: StructureConfig) -> Self {
        Self { config }
    }

    /// 감지에 필요한 최소 봉 수 (2 × W).
    pub fn min_bars(&self) -> usize {
        2 * self.config.window
    }

    pub fn detect(&self, series: &PriceSeries) -> StructureLevels {
        let n = series.len();
        if n < self.min_bars() {
            debug!(
                symbol = series.symbol(),
                bars = n,
                required = self.min_bars(),
                "구조 감지 생략: 데이터 부족"
            );
            return StructureLevels::empty();
        }

        let highs: Vec<f64> = series.bars().iter().map(|b| b.high.as_f64()).collect();
        let lows: Vec<f64> = series.bars().iter().map(|b| b.low.as_f64()).collect();
        let closes = series.closes_f64();
        let last_close = series.current_price().as_f64();

        let (peaks, troughs) = find_extrema(&highs, &lows, self.config.window);

        let extreme_prices: Vec<f64> = peaks.iter().chain(&troughs).map(|e| e.price).collect();
        let levels = cluster_levels(&extreme_prices, self.config.cluster_tolerance, last_close);

        let tol = self.config.pattern_tolerance;
        let patterns: Vec<_> = [
            patterns::detect_double(&peaks, &troughs, PatternKind::DoubleTop, tol),
            patterns::detect_double(&troughs, &peaks, PatternKind::DoubleBottom, tol),
            patterns::detect_triangle(&highs, &lows, &self.config),
            patterns::detect_flag(&closes, &self.config),
        ]
        .into_iter()
        .flatten()
        .collect();

        debug!(
            symbol = series.symbol(),
            peaks = peaks.len(),
            troughs = troughs.len(),
            levels = levels.len(),
            patterns = patterns.len(),
            "구조 감지 완료"
        );

        StructureLevels { levels, patterns }
    }
}
