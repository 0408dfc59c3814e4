//! 모멘텀 지표 (Momentum Indicators).
//!
//! 가격 모멘텀과 과매수/과매도 상태를 측정하는 오실레이터를 제공합니다.
//! - RSI (Relative Strength Index)
//! - Stochastic Oscillator
//! - Williams %R
//! - CCI (Commodity Channel Index)
//! - MFI (Money Flow Index)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ohlc_len, require, require_period, IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 스토캐스틱 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochasticParams {
    /// %K 기간 (기본: 14).
    pub k_period: usize,
    /// %D 기간 (smoothing, 기본: 3).
    pub d_period: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

/// 스토캐스틱 결과.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochasticResult {
    /// %K (Fast Stochastic).
    pub k: Option<Decimal>,
    /// %D (Slow Stochastic, %K의 이동평균).
    pub d: Option<Decimal>,
}

/// Williams %R 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WilliamsParams {
    pub period: usize,
}

impl Default for WilliamsParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// CCI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CciParams {
    pub period: usize,
}

impl Default for CciParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// MFI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MfiParams {
    pub period: usize,
}

impl Default for MfiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// CCI 평균 편차 상수 (Lambert).
const CCI_CONSTANT: Decimal = dec!(0.015);

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭.
    ///
    /// 첫 평균은 처음 period개 변화량의 단순 평균이고, 이후 Wilder 평활
    /// (alpha = 1 / period)을 적용합니다. 첫 값은 인덱스 period에 나타나므로
    /// period + 1개의 가격이 필요합니다.
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;
        require_period(period)?;
        require(prices.len(), period + 1)?;

        let (gains, losses): (Vec<Decimal>, Vec<Decimal>) = prices
            .windows(2)
            .map(|w| {
                let delta = w[1] - w[0];
                if delta > Decimal::ZERO {
                    (delta, Decimal::ZERO)
                } else {
                    (Decimal::ZERO, -delta)
                }
            })
            .unzip();

        let avg_gains = wilder_smooth(&gains, period);
        let avg_losses = wilder_smooth(&losses, period);

        let mut result = vec![None];
        for (gain, loss) in avg_gains.into_iter().zip(avg_losses) {
            let value = match (gain, loss) {
                (Some(gain), Some(loss)) => Some(rsi_from_averages(gain, loss)),
                _ => None,
            };
            result.push(value);
        }

        Ok(result)
    }

    /// 스토캐스틱 오실레이터 계산.
    ///
    /// %K = (현재가 - 최저가) / (최고가 - 최저가) × 100,
    /// %D = %K의 d_period 단순 이동평균. 범위가 0이면 %K = 50.
    /// 종가가 고가/저가 범위를 벗어난 봉은 0 ~ 100으로 제한합니다.
    pub fn stochastic(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: StochasticParams,
    ) -> IndicatorResult<Vec<StochasticResult>> {
        require_period(params.k_period)?;
        require_period(params.d_period)?;
        let len = ohlc_len(high, low, close)?;
        require(len, params.k_period)?;

        let k_values: Vec<Option<Decimal>> = (0..len)
            .map(|i| {
                rolling_range(high, low, i, params.k_period).map(|(highest, lowest)| {
                    let range = highest - lowest;
                    if range == Decimal::ZERO {
                        dec!(50)
                    } else {
                        let fallback = if close[i] < lowest { Decimal::ZERO } else { dec!(100) };
                        (close[i] - lowest)
                            .checked_div(range)
                            .and_then(|k| k.checked_mul(dec!(100)))
                            .unwrap_or(fallback)
                            .clamp(Decimal::ZERO, dec!(100))
                    }
                })
            })
            .collect();

        let d_start = params.k_period + params.d_period - 2;
        let result = (0..len)
            .map(|i| {
                let d = if i >= d_start {
                    let window = &k_values[i + 1 - params.d_period..=i];
                    let sum: Decimal = window.iter().flatten().sum();
                    Some(sum / Decimal::from(params.d_period))
                } else {
                    None
                };
                StochasticResult { k: k_values[i], d }
            })
            .collect();

        Ok(result)
    }

    /// Williams %R 계산.
    ///
    /// %R = -100 × (최고가 - 현재가) / (최고가 - 최저가), 범위 -100 ~ 0.
    /// 범위가 0이면 -50.
    pub fn williams_r(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: WilliamsParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        require_period(params.period)?;
        let len = ohlc_len(high, low, close)?;
        require(len, params.period)?;

        let result = (0..len)
            .map(|i| {
                rolling_range(high, low, i, params.period).map(|(highest, lowest)| {
                    let range = highest - lowest;
                    if range == Decimal::ZERO {
                        dec!(-50)
                    } else {
                        let fallback = if close[i] > highest { Decimal::ZERO } else { dec!(-100) };
                        (highest - close[i])
                            .checked_div(range)
                            .and_then(|r| r.checked_mul(dec!(-100)))
                            .unwrap_or(fallback)
                            .clamp(dec!(-100), Decimal::ZERO)
                    }
                })
            })
            .collect();

        Ok(result)
    }

    /// CCI (Commodity Channel Index) 계산.
    ///
    /// CCI = (TP - SMA(TP)) / (0.015 × 평균 절대 편차), TP = (고가 + 저가 + 종가) / 3.
    /// 평균 절대 편차가 0이면 0.
    pub fn cci(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: CciParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;
        require_period(period)?;
        let len = ohlc_len(high, low, close)?;
        require(len, period)?;

        let typical = typical_prices(high, low, close);
        let n = Decimal::from(period);

        let result = (0..len)
            .map(|i| {
                if i + 1 < period {
                    return None;
                }
                let window = &typical[i + 1 - period..=i];
                let mean = window.iter().sum::<Decimal>() / n;
                let mad = window.iter().map(|tp| (*tp - mean).abs()).sum::<Decimal>() / n;
                if mad == Decimal::ZERO {
                    Some(Decimal::ZERO)
                } else {
                    (typical[i] - mean).checked_div(CCI_CONSTANT * mad)
                }
            })
            .collect();

        Ok(result)
    }

    /// MFI (Money Flow Index) 계산.
    ///
    /// 대표가가 상승한 날의 자금 흐름(대표가 × 거래량)을 양의 흐름, 하락한 날을
    /// 음의 흐름으로 period일 합산합니다.
    /// MFI = 100 - 100 / (1 + 양의 흐름 / 음의 흐름).
    /// 음의 흐름이 0이면 100, 두 흐름이 모두 0이면 50입니다.
    pub fn mfi(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        volume: &[Decimal],
        params: MfiParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;
        require_period(period)?;
        let len = ohlc_len(high, low, close)?;
        if volume.len() != len {
            return Err(IndicatorError::InvalidParameter(
                "거래량 데이터의 길이가 일치하지 않습니다".to_string(),
            ));
        }
        require(len, period + 1)?;

        let typical = typical_prices(high, low, close);
        // 인덱스 0은 비교 대상이 없으므로 흐름 0
        let mut positive = vec![Decimal::ZERO; len];
        let mut negative = vec![Decimal::ZERO; len];
        for i in 1..len {
            let flow = typical[i] * volume[i];
            if typical[i] > typical[i - 1] {
                positive[i] = flow;
            } else if typical[i] < typical[i - 1] {
                negative[i] = flow;
            }
        }

        let result = (0..len)
            .map(|i| {
                if i < period {
                    return None;
                }
                let window = i + 1 - period..=i;
                let pos: Decimal = positive[window.clone()].iter().sum();
                let neg: Decimal = negative[window].iter().sum();
                let value = if neg == Decimal::ZERO {
                    if pos == Decimal::ZERO {
                        dec!(50)
                    } else {
                        dec!(100)
                    }
                } else {
                    index_from_ratio(pos, neg)
                };
                Some(value)
            })
            .collect();

        Ok(result)
    }
}

/// Wilder 평활. 처음 period개의 평균으로 시작하고 이후 alpha = 1/period.
fn wilder_smooth(values: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let mut result = Vec::with_capacity(values.len());
    if values.len() < period {
        result.resize(values.len(), None);
        return result;
    }

    let n = Decimal::from(period);
    result.resize(period - 1, None);
    let mut avg = values[..period].iter().sum::<Decimal>() / n;
    result.push(Some(avg));

    for value in &values[period..] {
        avg = (avg * (n - Decimal::ONE) + *value) / n;
        result.push(Some(avg));
    }
    result
}

fn rsi_from_averages(gain: Decimal, loss: Decimal) -> Decimal {
    if loss == Decimal::ZERO {
        if gain == Decimal::ZERO {
            // 변화가 전혀 없으면 중립
            return dec!(50);
        }
        return dec!(100);
    }
    index_from_ratio(gain, loss)
}

/// 100 - 100 / (1 + 분자 / 분모).
///
/// 평활 평균이 0에 가까워 비율이 Decimal 범위를 넘으면 상한 100으로 포화시킵니다.
fn index_from_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator
        .checked_div(denominator)
        .and_then(|ratio| Decimal::ONE.checked_add(ratio))
        .and_then(|base| dec!(100).checked_div(base))
        .map_or(dec!(100), |tail| (dec!(100) - tail).clamp(Decimal::ZERO, dec!(100)))
}

/// 인덱스 i에서 끝나는 period 구간의 (최고가, 최저가).
fn rolling_range(
    high: &[Decimal],
    low: &[Decimal],
    i: usize,
    period: usize,
) -> Option<(Decimal, Decimal)> {
    if i + 1 < period {
        return None;
    }
    let start = i + 1 - period;
    let highest = high[start..=i].iter().max().copied()?;
    let lowest = low[start..=i].iter().min().copied()?;
    Some((highest, lowest))
}

fn typical_prices(high: &[Decimal], low: &[Decimal], close: &[Decimal]) -> Vec<Decimal> {
    high.iter()
        .zip(low)
        .zip(close)
        .map(|((h, l), c)| (*h + *l + *c) / dec!(3))
        .collect()
}
