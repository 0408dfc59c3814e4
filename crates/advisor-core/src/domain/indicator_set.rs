//! 기술적 지표 결과 집합.
//!
//! 분석 호출마다 전체가 새로 계산되며, 최소 윈도우를 채우지 못한 지표는
//! 숫자 기본값 대신 `Unavailable`로 표시됩니다.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 지표 이름.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndicatorName {
    #[serde(rename = "RSI-14")]
    Rsi14,
    #[serde(rename = "MACD")]
    Macd,
    #[serde(rename = "MACD signal")]
    MacdSignal,
    #[serde(rename = "MACD histogram")]
    MacdHistogram,
    #[serde(rename = "Stochastic %K")]
    StochasticK,
    #[serde(rename = "Stochastic %D")]
    StochasticD,
    #[serde(rename = "Williams %R")]
    WilliamsR,
    #[serde(rename = "CCI-20")]
    Cci20,
    #[serde(rename = "ATR-14")]
    Atr14,
    #[serde(rename = "Parabolic SAR")]
    ParabolicSar,
    #[serde(rename = "MFI-14")]
    Mfi14,
    #[serde(rename = "SMA-20")]
    Sma20,
    #[serde(rename = "SMA-50")]
    Sma50,
    #[serde(rename = "Bollinger %B")]
    BollingerPercentB,
}

impl IndicatorName {
    /// 모든 지표 이름.
    pub const ALL: [IndicatorName; 14] = [
        IndicatorName::Rsi14,
        IndicatorName::Macd,
        IndicatorName::MacdSignal,
        IndicatorName::MacdHistogram,
        IndicatorName::StochasticK,
        IndicatorName::StochasticD,
        IndicatorName::WilliamsR,
        IndicatorName::Cci20,
        IndicatorName::Atr14,
        IndicatorName::ParabolicSar,
        IndicatorName::Mfi14,
        IndicatorName::Sma20,
        IndicatorName::Sma50,
        IndicatorName::BollingerPercentB,
    ];

    /// 표시용 이름.
    pub fn label(&self) -> &'static str {
        match self {
            IndicatorName::Rsi14 => "RSI-14",
            IndicatorName::Macd => "MACD",
            IndicatorName::MacdSignal => "MACD signal",
            IndicatorName::MacdHistogram => "MACD histogram",
            IndicatorName::StochasticK => "Stochastic %K",
            IndicatorName::StochasticD => "Stochastic %D",
            IndicatorName::WilliamsR => "Williams %R",
            IndicatorName::Cci20 => "CCI-20",
            IndicatorName::Atr14 => "ATR-14",
            IndicatorName::ParabolicSar => "Parabolic SAR",
            IndicatorName::Mfi14 => "MFI-14",
            IndicatorName::Sma20 => "SMA-20",
            IndicatorName::Sma50 => "SMA-50",
            IndicatorName::BollingerPercentB => "Bollinger %B",
        }
    }
}

impl fmt::Display for IndicatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 지표의 정성적 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    /// 과매수
    Overbought,
    /// 과매도
    Oversold,
    /// 중립
    Neutral,
    /// 강세
    Bullish,
    /// 약세
    Bearish,
}

impl SignalState {
    /// 방향성: 강세/과매도 +1, 약세/과매수 -1, 중립 0.
    pub fn direction(&self) -> i32 {
        match self {
            SignalState::Bullish | SignalState::Oversold => 1,
            SignalState::Bearish | SignalState::Overbought => -1,
            SignalState::Neutral => 0,
        }
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalState::Overbought => "overbought",
            SignalState::Oversold => "oversold",
            SignalState::Neutral => "neutral",
            SignalState::Bullish => "bullish",
            SignalState::Bearish => "bearish",
        };
        f.write_str(s)
    }
}

/// 단일 지표 값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndicatorReading {
    /// 계산된 현재 값과 상태
    Available {
        value: Decimal,
        state: Option<SignalState>,
    },
    /// 데이터 부족으로 계산하지 않음
    Unavailable { required: usize, provided: usize },
}

impl IndicatorReading {
    /// 상태가 있는 값.
    pub fn with_state(value: Decimal, state: SignalState) -> Self {
        IndicatorReading::Available {
            value,
            state: Some(state),
        }
    }

    /// 상태가 없는 값 (예: ATR).
    pub fn value_only(value: Decimal) -> Self {
        IndicatorReading::Available { value, state: None }
    }

    pub fn unavailable(required: usize, provided: usize) -> Self {
        IndicatorReading::Unavailable { required, provided }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, IndicatorReading::Available { .. })
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            IndicatorReading::Available { value, .. } => Some(*value),
            IndicatorReading::Unavailable { .. } => None,
        }
    }

    pub fn state(&self) -> Option<SignalState> {
        match self {
            IndicatorReading::Available { state, .. } => *state,
            IndicatorReading::Unavailable { .. } => None,
        }
    }
}

/// 지표 이름 → 지표 값 매핑.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSet {
    readings: BTreeMap<IndicatorName, IndicatorReading>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 지표 값을 기록합니다. 같은 이름이 있으면 교체합니다.
    pub fn insert(&mut self, name: IndicatorName, reading: IndicatorReading) {
        self.readings.insert(name, reading);
    }

    pub fn get(&self, name: IndicatorName) -> Option<&IndicatorReading> {
        self.readings.get(&name)
    }

    /// 사용 가능한 지표의 값.
    pub fn value(&self, name: IndicatorName) -> Option<Decimal> {
        self.get(name).and_then(IndicatorReading::value)
    }

    /// 사용 가능한 지표의 상태.
    pub fn state(&self, name: IndicatorName) -> Option<SignalState> {
        self.get(name).and_then(IndicatorReading::state)
    }

    pub fn is_available(&self, name: IndicatorName) -> bool {
        self.get(name).is_some_and(IndicatorReading::is_available)
    }

    /// 사용 가능한 지표만 순회합니다.
    pub fn available(&self) -> impl Iterator<Item = (IndicatorName, Decimal, Option<SignalState>)> + '_ {
        self.readings.iter().filter_map(|(name, reading)| match reading {
            IndicatorReading::Available { value, state } => Some((*name, *value, *state)),
            IndicatorReading::Unavailable { .. } => None,
        })
    }

    /// 사용할 수 없는 지표 이름.
    pub fn unavailable(&self) -> Vec<IndicatorName> {
        self.readings
            .iter()
            .filter(|(_, r)| !r.is_available())
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IndicatorName, &IndicatorReading)> {
        self.readings.iter()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
