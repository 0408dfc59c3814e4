//! 변동성 지표 (Volatility Indicators).
//!
//! 가격 변동성을 측정하는 지표들을 제공합니다.
//! - ATR (Average True Range, 평균 실제 범위)
//! - Bollinger Bands (볼린저 밴드)
//! - 역사적 변동성 (연율화)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ohlc_len, require, require_period, sqrt_decimal, IndicatorError, IndicatorResult};
use crate::stats;

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: Decimal,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: dec!(2.0),
        }
    }
}

/// 볼린저 밴드 결과.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsResult {
    pub upper: Option<Decimal>,
    pub middle: Option<Decimal>,
    pub lower: Option<Decimal>,
    /// %B = (가격 - 하단) / (상단 - 하단)
    pub percent_b: Option<Decimal>,
    /// 밴드 폭 = (상단 - 하단) / 중간
    pub bandwidth: Option<Decimal>,
}

impl BollingerBandsResult {
    fn empty() -> Self {
        Self {
            upper: None,
            middle: None,
            lower: None,
            percent_b: None,
            bandwidth: None,
        }
    }
}

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtrParams {
    /// ATR 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 역사적 변동성 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HistoricalVolatilityParams {
    /// 수익률 윈도우 (기본: 20).
    pub window: usize,
    /// 연간 거래일 수 (기본: 252).
    pub trading_days: f64,
}

impl Default for HistoricalVolatilityParams {
    fn default() -> Self {
        Self {
            window: 20,
            trading_days: 252.0,
        }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    pub fn new() -> Self {
        Self
    }

    /// 볼린저 밴드 계산.
    ///
    /// 중간 밴드 = SMA, 상/하단 = SMA ± k × 모표준편차.
    /// 밴드가 수렴하면 %B = 0.5.
    pub fn bollinger_bands(
        &self,
        prices: &[Decimal],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        let period = params.period;
        require_period(period)?;
        require(prices.len(), period)?;

        let period_decimal = Decimal::from(period);
        let mut result = Vec::with_capacity(prices.len());

        for i in 0..prices.len() {
            if i + 1 < period {
                result.push(BollingerBandsResult::empty());
                continue;
            }

            let window = &prices[i + 1 - period..=i];
            let ma = window.iter().sum::<Decimal>() / period_decimal;
            let variance = window
                .iter()
                .map(|&p| {
                    let diff = p - ma;
                    diff * diff
                })
                .sum::<Decimal>()
                / period_decimal;

            let deviation = params.std_dev_multiplier * sqrt_decimal(variance);
            let upper = ma + deviation;
            let lower = ma - deviation;

            let percent_b = if upper != lower {
                (prices[i] - lower).checked_div(upper - lower).unwrap_or(dec!(0.5))
            } else {
                dec!(0.5)
            };
            let bandwidth = (upper - lower).checked_div(ma);

            result.push(BollingerBandsResult {
                upper: Some(upper),
                middle: Some(ma),
                lower: Some(lower),
                percent_b: Some(percent_b),
                bandwidth,
            });
        }

        Ok(result)
    }

    /// ATR (Average True Range) 계산.
    ///
    /// TR = max(고가 - 저가, |고가 - 전일 종가|, |저가 - 전일 종가|).
    /// 첫 ATR은 인덱스 1..=period의 TR 평균이며 이후 Wilder 평활을 적용합니다.
    /// period + 1개의 봉이 필요합니다.
    pub fn atr(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;
        require_period(period)?;
        let len = ohlc_len(high, low, close)?;
        require(len, period + 1)?;

        let true_ranges: Vec<Decimal> = (1..len)
            .map(|i| {
                let hl = high[i] - low[i];
                let hc = (high[i] - close[i - 1]).abs();
                let lc = (low[i] - close[i - 1]).abs();
                hl.max(hc).max(lc)
            })
            .collect();

        let n = Decimal::from(period);
        let mut result = vec![None; period];
        let mut atr = true_ranges[..period].iter().sum::<Decimal>() / n;
        result.push(Some(atr));

        for tr in &true_ranges[period..] {
            atr = (atr * (n - Decimal::ONE) + *tr) / n;
            result.push(Some(atr));
        }

        Ok(result)
    }

    /// 연율화 역사적 변동성.
    ///
    /// 최근 window개 로그 수익률의 표본 표준편차 × √trading_days.
    pub fn historical_volatility(
        &self,
        closes: &[f64],
        params: HistoricalVolatilityParams,
    ) -> IndicatorResult<f64> {
        if params.window < 2 {
            return Err(IndicatorError::InvalidParameter(
                "변동성 윈도우는 2 이상이어야 합니다".to_string(),
            ));
        }
        require(closes.len(), params.window + 1)?;

        let recent = &closes[closes.len() - params.window - 1..];
        let returns = stats::log_returns(recent);
        let vol = stats::sample_std(&returns) * params.trading_days.sqrt();

        if !vol.is_finite() {
            return Err(IndicatorError::CalculationError(
                "변동성이 유한하지 않습니다".to_string(),
            ));
        }
        Ok(vol)
    }
}
