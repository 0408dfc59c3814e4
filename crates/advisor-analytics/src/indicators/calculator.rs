//! 지표 집합 계산기.
//!
//! [`IndicatorEngine`]의 시계열 함수를 호출해 각 지표의 최신 값과 신호 상태를
//! [`IndicatorSet`]으로 묶습니다. 최소 윈도우를 채우지 못한 지표는
//! `Unavailable`로 표시되며 기본값으로 대체되지 않습니다.

use advisor_core::{
    IndicatorConfig, IndicatorName, IndicatorReading, IndicatorSet, PriceSeries, SignalState,
};
use rust_decimal::Decimal;
use tracing::debug;

use super::{
    last_value, AtrParams, BollingerBandsParams, CciParams, IndicatorEngine, IndicatorError,
    IndicatorResult, MacdParams, MfiParams, PsarParams, RsiParams, SmaParams, StochasticParams,
    WilliamsParams,
};

/// 지표 집합 계산기.
#[derive(Debug, Default)]
pub struct IndicatorCalculator {
    config: IndicatorConfig,
    engine: IndicatorEngine,
}

/// 과매수/과매도 임계값 분류.
fn classify_band(value: Decimal, overbought: Decimal, oversold: Decimal) -> SignalState {
    if value > overbought {
        SignalState::Overbought
    } else if value < oversold {
        SignalState::Oversold
    } else {
        SignalState::Neutral
    }
}

/// 가격이 기준선 위면 Bullish, 아니면 Bearish.
fn classify_above(price: Decimal, reference: Decimal) -> SignalState {
    if price > reference {
        SignalState::Bullish
    } else {
        SignalState::Bearish
    }
}

impl IndicatorCalculator {
    pub fn new(config: IndicatorConfig) -> Self {
        Self {
            config,
            engine: IndicatorEngine::new(),
        }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// 시계열의 마지막 봉 기준 지표 집합을 계산합니다.
    ///
    /// 데이터 부족은 해당 지표를 `Unavailable`로 기록하고, 그 외 오류는 전파합니다.
    pub fn calculate(&self, series: &PriceSeries) -> IndicatorResult<IndicatorSet> {
        let cfg = &self.config;
        let close = series.closes();
        let high = series.highs();
        let low = series.lows();
        let volume = series.volumes();
        let price = series.current_price();
        let n = close.len();

        let mut set = IndicatorSet::new();

        // RSI
        let rsi = self
            .engine
            .rsi(&close, RsiParams { period: cfg.rsi_period })
            .and_then(|v| last_value(&v, "RSI"));
        record(&mut set, IndicatorName::Rsi14, rsi, |v| {
            Some(classify_band(v, cfg.rsi_overbought, cfg.rsi_oversold))
        })?;

        // MACD: 세 값 모두 시그널 라인까지 필요
        let macd_params = MacdParams {
            fast_period: cfg.macd_fast,
            slow_period: cfg.macd_slow,
            signal_period: cfg.macd_signal,
        };
        match self.engine.macd(&close, macd_params) {
            Ok(values) => {
                let last = values.last().copied().ok_or_else(|| {
                    IndicatorError::CalculationError("MACD 결과가 비어 있습니다".to_string())
                })?;
                match (last.macd, last.signal, last.histogram) {
                    (Some(macd), Some(signal), Some(histogram)) => {
                        let state = if macd > signal {
                            SignalState::Bullish
                        } else {
                            SignalState::Bearish
                        };
                        set.insert(IndicatorName::Macd, IndicatorReading::with_state(macd, state));
                        set.insert(IndicatorName::MacdSignal, IndicatorReading::value_only(signal));
                        set.insert(
                            IndicatorName::MacdHistogram,
                            IndicatorReading::with_state(histogram, state),
                        );
                    }
                    _ => {
                        return Err(IndicatorError::CalculationError(
                            "MACD 마지막 값을 계산할 수 없습니다".to_string(),
                        ))
                    }
                }
            }
            Err(IndicatorError::InsufficientData { required, provided }) => {
                for name in [IndicatorName::Macd, IndicatorName::MacdSignal, IndicatorName::MacdHistogram] {
                    set.insert(name, IndicatorReading::unavailable(required, provided));
                }
            }
            Err(e) => return Err(e),
        }

        // Stochastic %K / %D
        let stoch_params = StochasticParams {
            k_period: cfg.stochastic_k,
            d_period: cfg.stochastic_d,
        };
        let stoch_state = |v| Some(classify_band(v, cfg.stochastic_overbought, cfg.stochastic_oversold));
        match self.engine.stochastic(&high, &low, &close, stoch_params) {
            Ok(values) => {
                let last = values.last().copied();
                let k = last.and_then(|r| r.k).ok_or_else(|| {
                    IndicatorError::CalculationError("%K 마지막 값을 계산할 수 없습니다".to_string())
                });
                record(&mut set, IndicatorName::StochasticK, k, stoch_state)?;

                let d_required = cfg.stochastic_k + cfg.stochastic_d - 1;
                let d = match last.and_then(|r| r.d) {
                    Some(d) => Ok(d),
                    None if n < d_required => Err(IndicatorError::InsufficientData {
                        required: d_required,
                        provided: n,
                    }),
                    None => Err(IndicatorError::CalculationError(
                        "%D 마지막 값을 계산할 수 없습니다".to_string(),
                    )),
                };
                record(&mut set, IndicatorName::StochasticD, d, stoch_state)?;
            }
            Err(IndicatorError::InsufficientData { required, provided }) => {
                set.insert(IndicatorName::StochasticK, IndicatorReading::unavailable(required, provided));
                set.insert(
                    IndicatorName::StochasticD,
                    IndicatorReading::unavailable(cfg.stochastic_k + cfg.stochastic_d - 1, provided),
                );
            }
            Err(e) => return Err(e),
        }

        // Williams %R
        let williams = self
            .engine
            .williams_r(&high, &low, &close, WilliamsParams { period: cfg.williams_period })
            .and_then(|v| last_value(&v, "Williams %R"));
        record(&mut set, IndicatorName::WilliamsR, williams, |v| {
            Some(classify_band(v, cfg.williams_overbought, cfg.williams_oversold))
        })?;

        // CCI
        let cci = self
            .engine
            .cci(&high, &low, &close, CciParams { period: cfg.cci_period })
            .and_then(|v| last_value(&v, "CCI"));
        record(&mut set, IndicatorName::Cci20, cci, |v| {
            Some(classify_band(v, cfg.cci_threshold, -cfg.cci_threshold))
        })?;

        // ATR: 상태 없음
        let atr = self
            .engine
            .atr(&high, &low, &close, AtrParams { period: cfg.atr_period })
            .and_then(|v| last_value(&v, "ATR"));
        record(&mut set, IndicatorName::Atr14, atr, |_| None)?;

        // Parabolic SAR
        let psar = self
            .engine
            .parabolic_sar(
                &high,
                &low,
                &close,
                PsarParams {
                    step: cfg.psar_step,
                    max_step: cfg.psar_max,
                },
            )
            .and_then(|v| last_value(&v, "Parabolic SAR"));
        record(&mut set, IndicatorName::ParabolicSar, psar, |sar| {
            Some(classify_above(price, sar))
        })?;

        // MFI
        let mfi = self
            .engine
            .mfi(&high, &low, &close, &volume, MfiParams { period: cfg.mfi_period })
            .and_then(|v| last_value(&v, "MFI"));
        record(&mut set, IndicatorName::Mfi14, mfi, |v| {
            Some(classify_band(v, cfg.mfi_overbought, cfg.mfi_oversold))
        })?;

        // SMA-20 / SMA-50
        for (name, period) in [
            (IndicatorName::Sma20, cfg.sma_short),
            (IndicatorName::Sma50, cfg.sma_long),
        ] {
            let sma = self
                .engine
                .sma(&close, SmaParams { period })
                .and_then(|v| last_value(&v, "SMA"));
            record(&mut set, name, sma, |v| Some(classify_above(price, v)))?;
        }

        // Bollinger %B
        let percent_b = self
            .engine
            .bollinger_bands(
                &close,
                BollingerBandsParams {
                    period: cfg.bollinger_period,
                    std_dev_multiplier: cfg.bollinger_std_dev,
                },
            )
            .and_then(|bands| {
                bands.last().and_then(|b| b.percent_b).ok_or_else(|| {
                    IndicatorError::CalculationError("%B 마지막 값을 계산할 수 없습니다".to_string())
                })
            });
        record(&mut set, IndicatorName::BollingerPercentB, percent_b, |v| {
            Some(classify_band(v, Decimal::ONE, Decimal::ZERO))
        })?;

        debug!(
            symbol = series.symbol(),
            bars = n,
            available = set.available().count(),
            unavailable = set.unavailable().len(),
            "지표 계산 완료"
        );

        Ok(set)
    }
}

/// 단일 값 지표 결과를 집합에 기록합니다.
fn record(
    set: &mut IndicatorSet,
    name: IndicatorName,
    result: IndicatorResult<Decimal>,
    state: impl Fn(Decimal) -> Option<SignalState>,
) -> IndicatorResult<()> {
    match result {
        Ok(value) => {
            let reading = match state(value) {
                Some(s) => IndicatorReading::with_state(value, s),
                None => IndicatorReading::value_only(value),
            };
            set.insert(name, reading);
            Ok(())
        }
        Err(IndicatorError::InsufficientData { required, provided }) => {
            set.insert(name, IndicatorReading::unavailable(required, provided));
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::Bar;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn series(closes: &[Decimal]) -> PriceSeries {
        PriceSeries::from_closes("TEST", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), closes).unwrap()
    }

    fn zigzag(n: usize) -> Vec<Decimal> {
        (0..n)
            .map(|i| Decimal::from(100 + (i % 7) as i64) + Decimal::from(i as i64) / dec!(10))
            .collect()
    }

    #[test]
    fn test_short_series_marks_unavailable() {
        let calc = IndicatorCalculator::default();
        let set = calc.calculate(&series(&zigzag(10))).unwrap();

        assert!(!set.is_available(IndicatorName::Rsi14));
        assert_eq!(
            set.get(IndicatorName::Rsi14),
            Some(&IndicatorReading::unavailable(15, 10))
        );
        assert_eq!(
            set.get(IndicatorName::Macd),
            Some(&IndicatorReading::unavailable(34, 10))
        );
        assert!(set.is_available(IndicatorName::ParabolicSar));
        assert_eq!(set.len(), IndicatorName::ALL.len());
    }

    #[test]
    fn test_minimum_windows() {
        let calc = IndicatorCalculator::default();

        let set = calc.calculate(&series(&zigzag(14))).unwrap();
        assert!(set.is_available(IndicatorName::StochasticK));
        assert!(set.is_available(IndicatorName::WilliamsR));
        assert!(!set.is_available(IndicatorName::StochasticD));
        assert!(!set.is_available(IndicatorName::Rsi14));

        let set = calc.calculate(&series(&zigzag(16))).unwrap();
        assert!(set.is_available(IndicatorName::StochasticD));
        assert!(set.is_available(IndicatorName::Rsi14));
        assert!(set.is_available(IndicatorName::Atr14));
        assert!(set.is_available(IndicatorName::Mfi14));
        assert!(!set.is_available(IndicatorName::Cci20));

        let set = calc.calculate(&series(&zigzag(33))).unwrap();
        assert!(!set.is_available(IndicatorName::Macd));
        let set = calc.calculate(&series(&zigzag(34))).unwrap();
        assert!(set.is_available(IndicatorName::Macd));
        assert!(set.is_available(IndicatorName::MacdSignal));
        assert!(set.is_available(IndicatorName::MacdHistogram));
        assert!(!set.is_available(IndicatorName::Sma50));
    }

    #[test]
    fn test_full_series_states() {
        let calc = IndicatorCalculator::default();
        let rising: Vec<Decimal> = (0..60).map(|i| Decimal::from(100 + i)).collect();
        let set = calc.calculate(&series(&rising)).unwrap();

        assert!(set.unavailable().is_empty());
        assert_eq!(set.state(IndicatorName::Rsi14), Some(SignalState::Overbought));
        assert_eq!(set.state(IndicatorName::Sma20), Some(SignalState::Bullish));
        assert_eq!(set.state(IndicatorName::Sma50), Some(SignalState::Bullish));
        assert_eq!(set.state(IndicatorName::Atr14), None);
        assert!(set.value(IndicatorName::Atr14).is_some());
    }

    #[test]
    fn test_oscillator_bounds() {
        let calc = IndicatorCalculator::default();
        let bars: Vec<Bar> = (0..40)
            .map(|i| {
                let base = Decimal::from(100 + (i * 7 % 11) as i64);
                Bar::new(
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i),
                    base,
                    base + dec!(2),
                    base - dec!(2),
                    base + dec!(0.5),
                    Decimal::from(1000 + i * 10),
                )
            })
            .collect();
        let set = calc.calculate(&PriceSeries::new("OSC", bars).unwrap()).unwrap();

        for name in [
            IndicatorName::Rsi14,
            IndicatorName::StochasticK,
            IndicatorName::StochasticD,
            IndicatorName::Mfi14,
        ] {
            let v = set.value(name).unwrap();
            assert!(v >= Decimal::ZERO && v <= dec!(100), "{} = {}", name, v);
        }
        let r = set.value(IndicatorName::WilliamsR).unwrap();
        assert!(r >= dec!(-100) && r <= Decimal::ZERO);
    }
}
