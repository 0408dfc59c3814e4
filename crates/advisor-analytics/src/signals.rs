//! 시계열에서 도출하는 모멘텀/거래량 점수.
//!
//! 외부 모멘텀·거래량 협력자가 없는 호출자를 위한 보조 계산입니다.
//! 두 점수 모두 50에서 시작해 가감한 뒤 0 ~ 100으로 자르며, 데이터가
//! 부족하면 `None`을 반환합니다.

use advisor_core::PriceSeries;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::indicators::{SmaParams, TrendIndicators, VolumeIndicators};
use crate::stats;

/// 수익률 평균 / 평균 거래량 윈도우.
const LOOKBACK: usize = 20;
/// 거래량 추세 비교 간격.
const VOLUME_TREND_GAP: usize = 10;
/// OBV 추세 룩백.
const OBV_LOOKBACK: usize = 5;
/// 평균 일간 수익률 1당 모멘텀 점수.
const RETURN_SCALE: f64 = 1000.0;
/// 거래량 돌파 배수.
const BREAKOUT_RATIO: Decimal = dec!(1.5);

/// 모멘텀/거래량 점수 계산기.
#[derive(Debug, Default)]
pub struct MarketSignals {
    trend: TrendIndicators,
    volume: VolumeIndicators,
}

impl MarketSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// 모멘텀 점수.
    ///
    /// - 최근 20일 평균 수익률 × 1000
    /// - 거래량 증가 +10 / 감소 -5
    /// - SMA-20, SMA-50 위 +15, SMA-20만 위 +5, 둘 다 아래 -15
    ///
    /// 21개 미만의 봉에서는 `None`.
    pub fn momentum_score(&self, series: &PriceSeries) -> Option<f64> {
        let closes = series.closes_f64();
        let n = closes.len();
        if n < LOOKBACK + 1 {
            return None;
        }

        let returns = stats::pct_returns(&closes[n - LOOKBACK - 1..]);
        let mut score: f64 = 50.0 + stats::mean(&returns) * RETURN_SCALE;

        let volumes = series.volumes();
        if volumes.iter().any(|v| *v > Decimal::ZERO) {
            let last = volumes[n - 1];
            let earlier = volumes[n - 1 - VOLUME_TREND_GAP];
            if last > earlier {
                score += 10.0;
            } else if last < earlier {
                score -= 5.0;
            }
        }

        let price = series.current_price();
        let closes_dec = series.closes();
        let above = |period: usize| -> Option<bool> {
            self.trend
                .sma(&closes_dec, SmaParams { period })
                .ok()
                .and_then(|v| v.last().copied().flatten())
                .map(|sma| price > sma)
        };
        match (above(20), above(50)) {
            (Some(true), Some(true)) => score += 15.0,
            (Some(true), _) => score += 5.0,
            (Some(false), Some(false)) => score -= 15.0,
            _ => {}
        }

        Some(score.clamp(0.0, 100.0))
    }

    /// 거래량 점수.
    ///
    /// - 현재/20일 평균 거래량 > 2: +15, > 1.5: +10, < 0.5: -10
    /// - 거래량 돌파 (> 1.5배): +20
    /// - 최근 5일 OBV 변화 평균 양수 +10, 음수 -10
    ///
    /// 20개 미만의 봉이거나 평균 거래량이 0이면 `None`.
    pub fn volume_score(&self, series: &PriceSeries) -> Option<f64> {
        let volumes = series.volumes();
        let ratio = self.volume.volume_ratio(&volumes, LOOKBACK).ok().flatten()?;

        let mut score: f64 = 50.0;
        if ratio > dec!(2) {
            score += 15.0;
        } else if ratio > BREAKOUT_RATIO {
            score += 10.0;
        } else if ratio < dec!(0.5) {
            score -= 10.0;
        }
        if ratio > BREAKOUT_RATIO {
            score += 20.0;
        }

        let obv_trend = self
            .volume
            .obv(&series.closes(), &volumes)
            .and_then(|obv| self.volume.obv_trend(&obv, OBV_LOOKBACK));
        if let Ok(trend) = obv_trend {
            if trend > Decimal::ZERO {
                score += 10.0;
            } else if trend < Decimal::ZERO {
                score -= 10.0;
            }
        }

        Some(score.clamp(0.0, 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::Bar;
    use chrono::NaiveDate;

    fn series(closes: &[f64], volumes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let bars = closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (c, v))| {
                let close = Decimal::try_from(*c).unwrap();
                Bar::flat(
                    start + chrono::Duration::days(i as i64),
                    close,
                    Decimal::try_from(*v).unwrap(),
                )
            })
            .collect();
        PriceSeries::new("SIG", bars).unwrap()
    }

    #[test]
    fn test_momentum_uptrend() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let volumes: Vec<f64> = (0..60).map(|i| 1000.0 + i as f64 * 10.0).collect();
        let score = MarketSignals::new().momentum_score(&series(&closes, &volumes)).unwrap();
        // 50 + 약 6.6 + 10 + 15
        assert!(score > 80.0 && score <= 100.0);
    }

    #[test]
    fn test_momentum_downtrend_and_short_series() {
        let closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        let volumes = vec![1000.0; 60];
        let score = MarketSignals::new().momentum_score(&series(&closes, &volumes)).unwrap();
        assert!(score < 35.0);

        let short = series(&closes[..20], &volumes[..20]);
        assert!(MarketSignals::new().momentum_score(&short).is_none());
    }

    #[test]
    fn test_volume_breakout() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let mut volumes = vec![1000.0; 25];
        volumes[24] = 5000.0;
        let score = MarketSignals::new().volume_score(&series(&closes, &volumes)).unwrap();
        // 비율 ≈ 4.2: +15 +20, OBV 상승 +10
        assert_eq!(score, 95.0);
    }

    #[test]
    fn test_volume_flat_obv_is_neutral() {
        // 종가 변화가 없으면 OBV 변화량 평균은 0: 가감 없음
        let closes = vec![100.0; 25];
        let volumes = vec![1000.0; 25];
        let score = MarketSignals::new().volume_score(&series(&closes, &volumes)).unwrap();
        assert_eq!(score, 50.0);
    }

    #[test]
    fn test_volume_without_data() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let volumes = vec![0.0; 25];
        assert!(MarketSignals::new().volume_score(&series(&closes, &volumes)).is_none());
    }
}
