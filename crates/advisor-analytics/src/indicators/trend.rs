//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표와 Parabolic SAR을 제공합니다.
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)
//! - Parabolic SAR

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ohlc_len, require, require_period, IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 12 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl MacdParams {
    /// 시그널 라인까지 계산하는 데 필요한 최소 봉 수 (slow + signal - 1).
    pub fn min_bars(&self) -> usize {
        self.slow_period + self.signal_period - 1
    }
}

/// MACD 결과.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<Decimal>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<Decimal>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<Decimal>,
}

/// Parabolic SAR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PsarParams {
    /// 가속 계수 시작값 및 증가분 (기본: 0.02).
    pub step: Decimal,
    /// 가속 계수 최대값 (기본: 0.2).
    pub max_step: Decimal,
}

impl Default for PsarParams {
    fn default() -> Self {
        Self {
            step: dec!(0.02),
            max_step: dec!(0.2),
        }
    }
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// SMA = (P1 + P2 + ... + Pn) / n
    pub fn sma(
        &self,
        prices: &[Decimal],
        params: SmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;
        require_period(period)?;
        require(prices.len(), period)?;

        let period_decimal = Decimal::from(period);
        let mut result = vec![None; period - 1];
        let mut sum: Decimal = prices[..period].iter().sum();
        result.push(Some(sum / period_decimal));

        for i in period..prices.len() {
            sum += prices[i] - prices[i - period];
            result.push(Some(sum / period_decimal));
        }

        Ok(result)
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// EMA = (현재가 × k) + (이전 EMA × (1 - k)), k = 2 / (period + 1).
    /// 첫 값은 처음 period개의 SMA입니다.
    pub fn ema(
        &self,
        prices: &[Decimal],
        params: EmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;
        require_period(period)?;
        require(prices.len(), period)?;

        let multiplier = dec!(2) / Decimal::from(period + 1);
        let mut result = vec![None; period - 1];

        let initial_sma: Decimal = prices[..period].iter().sum::<Decimal>() / Decimal::from(period);
        result.push(Some(initial_sma));

        let mut prev_ema = initial_sma;
        for price in prices.iter().skip(period) {
            let ema = (*price * multiplier) + (prev_ema * (Decimal::ONE - multiplier));
            result.push(Some(ema));
            prev_ema = ema;
        }

        Ok(result)
    }

    /// MACD 계산.
    ///
    /// MACD 라인 = 단기 EMA - 장기 EMA,
    /// 시그널 라인 = MACD 라인의 EMA,
    /// 히스토그램 = MACD 라인 - 시그널 라인.
    ///
    /// 마지막 봉에 시그널 라인이 존재하려면 `slow + signal - 1`개가 필요합니다.
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        require_period(params.fast_period)?;
        require_period(params.signal_period)?;
        if params.fast_period >= params.slow_period {
            return Err(IndicatorError::InvalidParameter(format!(
                "단기 기간({})은 장기 기간({})보다 짧아야 합니다",
                params.fast_period, params.slow_period
            )));
        }
        require(prices.len(), params.min_bars())?;

        let fast_ema = self.ema(prices, EmaParams { period: params.fast_period })?;
        let slow_ema = self.ema(prices, EmaParams { period: params.slow_period })?;

        let macd_line: Vec<Option<Decimal>> = fast_ema
            .iter()
            .zip(&slow_ema)
            .map(|(fast, slow)| match (fast, slow) {
                (Some(f), Some(s)) => Some(*f - *s),
                _ => None,
            })
            .collect();

        // 시그널 라인은 MACD 값이 존재하는 구간에서만 계산
        let macd_values: Vec<Decimal> = macd_line.iter().flatten().copied().collect();
        let signal_ema = self.ema(&macd_values, EmaParams { period: params.signal_period })?;
        let offset = prices.len() - macd_values.len();

        let result = macd_line
            .iter()
            .enumerate()
            .map(|(i, macd)| {
                let signal = i
                    .checked_sub(offset)
                    .and_then(|j| signal_ema.get(j).copied().flatten());
                let histogram = match (*macd, signal) {
                    (Some(m), Some(s)) => Some(m - s),
                    _ => None,
                };
                MacdResult {
                    macd: *macd,
                    signal,
                    histogram,
                }
            })
            .collect();

        Ok(result)
    }

    /// Parabolic SAR 계산.
    ///
    /// 첫 봉에서 상승 추세, SAR = 첫 종가, 극값 = 첫 고가로 시작합니다.
    /// 가격이 SAR을 뚫으면 추세를 반전하고 SAR을 직전 극값으로 옮깁니다.
    /// 상승 추세의 SAR은 직전 두 봉의 저가를, 하락 추세의 SAR은 직전 두 봉의
    /// 고가를 넘지 않습니다.
    /// 첫 봉의 값은 None입니다.
    pub fn parabolic_sar(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: PsarParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        if params.step <= Decimal::ZERO || params.step > params.max_step {
            return Err(IndicatorError::InvalidParameter(
                "SAR 가속 계수는 0보다 크고 최대값 이하여야 합니다".to_string(),
            ));
        }
        let len = ohlc_len(high, low, close)?;
        require(len, 2)?;

        let mut result = Vec::with_capacity(len);
        result.push(None);

        let mut uptrend = true;
        let mut sar = close[0];
        let mut extreme = high[0];
        let mut af = params.step;

        for i in 1..len {
            sar += af * (extreme - sar);

            let prev = i.saturating_sub(2);
            if uptrend {
                let floor = low[prev..i].iter().min().copied().unwrap_or(sar);
                sar = sar.min(floor);
            } else {
                let ceiling = high[prev..i].iter().max().copied().unwrap_or(sar);
                sar = sar.max(ceiling);
            }

            if uptrend {
                if high[i] > extreme {
                    extreme = high[i];
                    af = (af + params.step).min(params.max_step);
                }
                if low[i] < sar {
                    uptrend = false;
                    sar = extreme;
                    extreme = low[i];
                    af = params.step;
                }
            } else {
                if low[i] < extreme {
                    extreme = low[i];
                    af = (af + params.step).min(params.max_step);
                }
                if high[i] > sar {
                    uptrend = true;
                    sar = extreme;
                    extreme = high[i];
                    af = params.step;
                }
            }

            result.push(Some(sar));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rising(n: usize) -> Vec<Decimal> {
        (0..n).map(|i| Decimal::from(100 + i as i64)).collect()
    }

    #[test]
    fn test_sma_rolling() {
        let trend = TrendIndicators::new();
        let prices = vec![dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)];
        let sma = trend.sma(&prices, SmaParams { period: 3 }).unwrap();

        assert_eq!(sma, vec![None, None, Some(dec!(2)), Some(dec!(3)), Some(dec!(4))]);
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let trend = TrendIndicators::new();
        let prices = vec![dec!(2), dec!(4), dec!(6), dec!(8)];
        let ema = trend.ema(&prices, EmaParams { period: 3 }).unwrap();

        assert_eq!(ema[2], Some(dec!(4)));
        // k = 0.5: 8 * 0.5 + 4 * 0.5
        assert_eq!(ema[3], Some(dec!(6)));
    }

    #[test]
    fn test_macd_minimum_window() {
        let trend = TrendIndicators::new();
        let params = MacdParams::default();
        assert_eq!(params.min_bars(), 34);

        let result = trend.macd(&rising(34), params).unwrap();
        let last = result.last().unwrap();
        assert!(last.macd.is_some());
        assert!(last.signal.is_some());
        assert!(last.histogram.is_some());
        // 시그널 라인은 마지막 봉에서 처음 나타남
        assert!(result[32].signal.is_none());

        let err = trend.macd(&rising(33), params).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                required: 34,
                provided: 33
            }
        );
    }

    #[test]
    fn test_macd_rising_market_is_positive() {
        let trend = TrendIndicators::new();
        let result = trend.macd(&rising(60), MacdParams::default()).unwrap();
        let last = result.last().unwrap();
        assert!(last.macd.unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_parabolic_sar_uptrend_stays_below_price() {
        let trend = TrendIndicators::new();
        let close = rising(30);
        let high: Vec<Decimal> = close.iter().map(|c| c + dec!(1)).collect();
        let low: Vec<Decimal> = close.iter().map(|c| c - dec!(1)).collect();

        let sar = trend
            .parabolic_sar(&high, &low, &close, PsarParams::default())
            .unwrap();
        assert!(sar[0].is_none());
        let last = sar.last().unwrap().unwrap();
        assert!(last < *close.last().unwrap());
    }

    #[test]
    fn test_parabolic_sar_reverses_on_drop() {
        let trend = TrendIndicators::new();
        let mut close = rising(10);
        close.extend((0..10).map(|i| Decimal::from(105 - 3 * i)));
        let high: Vec<Decimal> = close.iter().map(|c| c + dec!(0.5)).collect();
        let low: Vec<Decimal> = close.iter().map(|c| c - dec!(0.5)).collect();

        let sar = trend
            .parabolic_sar(&high, &low, &close, PsarParams::default())
            .unwrap();
        let last = sar.last().unwrap().unwrap();
        assert!(last > *close.last().unwrap());
    }

    #[test]
    fn test_parabolic_sar_invalid_params() {
        let trend = TrendIndicators::new();
        let prices = rising(5);
        let params = PsarParams {
            step: dec!(0.5),
            max_step: dec!(0.2),
        };
        assert!(trend.parabolic_sar(&prices, &prices, &prices, params).is_err());
    }
}
