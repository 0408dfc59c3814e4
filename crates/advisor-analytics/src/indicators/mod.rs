//! 기술적 지표 모듈.
//!
//! 일봉 시계열에서 오실레이터, 추세, 변동성, 거래량 지표를 계산합니다.
//! 모든 시계열 함수는 입력과 같은 길이의 `Vec<Option<Decimal>>` 형태를
//! 반환하며, 최소 윈도우보다 짧은 입력에는 `InsufficientData`를 반환합니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균
//! - **EMA**: 지수 이동평균 (SMA로 시작)
//! - **MACD**: 이동평균 수렴/확산 (12, 26, 9)
//! - **Parabolic SAR**: 포물선 손절/반전 (0.02, 0.02, 0.2)
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수 (Wilder 평활)
//! - **Stochastic**: 스토캐스틱 %K/%D
//! - **Williams %R**: -100 ~ 0 범위
//! - **CCI**: 상품 채널 지수
//! - **MFI**: 자금 흐름 지수
//!
//! ## 변동성 지표 (Volatility Indicators)
//! - **ATR**: 평균 실제 범위 (Wilder 평활)
//! - **Bollinger Bands**: 볼린저 밴드와 %B
//! - **Historical Volatility**: 연율화 로그 수익률 표준편차
//!
//! ## 거래량 지표 (Volume Indicators)
//! - **OBV**: 누적 거래량 균형
//!
//! # 사용 예시
//!
//! ```ignore
//! use advisor_analytics::indicators::{IndicatorEngine, RsiParams, SmaParams};
//!
//! let engine = IndicatorEngine::new();
//! let sma = engine.sma(&prices, SmaParams { period: 20 })?;
//! let rsi = engine.rsi(&prices, RsiParams { period: 14 })?;
//! ```

pub mod calculator;
pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

use advisor_core::AdvisorError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

pub use calculator::IndicatorCalculator;
pub use momentum::{
    CciParams, MfiParams, MomentumCalculator, RsiParams, StochasticParams, StochasticResult,
    WilliamsParams,
};
pub use trend::{EmaParams, MacdParams, MacdResult, PsarParams, SmaParams, TrendIndicators};
pub use volatility::{
    AtrParams, BollingerBandsParams, BollingerBandsResult, HistoricalVolatilityParams,
    VolatilityIndicators,
};
pub use volume::{ObvResult, VolumeIndicators};

/// 지표 계산 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

impl From<IndicatorError> for AdvisorError {
    fn from(err: IndicatorError) -> Self {
        match err {
            IndicatorError::InsufficientData { required, provided } => {
                AdvisorError::insufficient("indicator", required, provided)
            }
            IndicatorError::InvalidParameter(msg) => AdvisorError::InvalidParameter(msg),
            IndicatorError::CalculationError(msg) => AdvisorError::Calculation(msg),
        }
    }
}

/// 입력 길이가 최소 요구량 이상인지 확인합니다.
pub(crate) fn require(provided: usize, required: usize) -> IndicatorResult<()> {
    if provided < required {
        return Err(IndicatorError::InsufficientData { required, provided });
    }
    Ok(())
}

/// 기간 파라미터가 0이 아닌지 확인합니다.
pub(crate) fn require_period(period: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }
    Ok(())
}

/// 고가/저가/종가 길이가 같은지 확인하고 길이를 반환합니다.
pub(crate) fn ohlc_len(high: &[Decimal], low: &[Decimal], close: &[Decimal]) -> IndicatorResult<usize> {
    if high.len() != low.len() || low.len() != close.len() {
        return Err(IndicatorError::InvalidParameter(
            "고가/저가/종가 데이터의 길이가 일치하지 않습니다".to_string(),
        ));
    }
    Ok(close.len())
}

/// Decimal 제곱근 (Newton-Raphson).
pub(crate) fn sqrt_decimal(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let two = dec!(2);
    let mut x = if value > Decimal::ONE { value / two } else { Decimal::ONE };
    for _ in 0..64 {
        let next = (x + value / x) / two;
        if next == x {
            break;
        }
        x = next;
    }
    x
}

/// 통합 지표 엔진.
///
/// 모든 기술적 지표 계산을 위한 통합 인터페이스를 제공합니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
    volume: VolumeIndicators,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 추세 지표 ====================

    /// 단순 이동평균 (SMA). 처음 period-1개는 None.
    pub fn sma(&self, prices: &[Decimal], params: SmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.sma(prices, params)
    }

    /// 지수 이동평균 (EMA).
    pub fn ema(&self, prices: &[Decimal], params: EmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.ema(prices, params)
    }

    /// MACD 라인, 시그널 라인, 히스토그램.
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        self.trend.macd(prices, params)
    }

    /// Parabolic SAR.
    pub fn parabolic_sar(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: PsarParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.parabolic_sar(high, low, close, params)
    }

    // ==================== 모멘텀 지표 ====================

    /// RSI (0 ~ 100).
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.momentum.rsi(prices, params)
    }

    /// 스토캐스틱 %K, %D.
    pub fn stochastic(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: StochasticParams,
    ) -> IndicatorResult<Vec<StochasticResult>> {
        self.momentum.stochastic(high, low, close, params)
    }

    /// Williams %R (-100 ~ 0).
    pub fn williams_r(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: WilliamsParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.momentum.williams_r(high, low, close, params)
    }

    /// CCI.
    pub fn cci(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: CciParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.momentum.cci(high, low, close, params)
    }

    /// MFI (0 ~ 100).
    pub fn mfi(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        volume: &[Decimal],
        params: MfiParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.momentum.mfi(high, low, close, volume, params)
    }

    // ==================== 변동성 지표 ====================

    /// 볼린저 밴드.
    pub fn bollinger_bands(
        &self,
        prices: &[Decimal],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        self.volatility.bollinger_bands(prices, params)
    }

    /// ATR (Average True Range).
    pub fn atr(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.volatility.atr(high, low, close, params)
    }

    /// 연율화 역사적 변동성.
    pub fn historical_volatility(
        &self,
        closes: &[f64],
        params: HistoricalVolatilityParams,
    ) -> IndicatorResult<f64> {
        self.volatility.historical_volatility(closes, params)
    }

    // ==================== 거래량 지표 ====================

    /// OBV (On-Balance Volume).
    pub fn obv(&self, close: &[Decimal], volume: &[Decimal]) -> IndicatorResult<Vec<ObvResult>> {
        self.volume.obv(close, volume)
    }
}

/// 시계열의 마지막 값.
///
/// 최소 윈도우를 채운 시계열의 마지막 값이 비어 있으면 계산 오류입니다.
pub(crate) fn last_value(values: &[Option<Decimal>], name: &str) -> IndicatorResult<Decimal> {
    values.last().copied().flatten().ok_or_else(|| {
        IndicatorError::CalculationError(format!("{} 마지막 값을 계산할 수 없습니다", name))
    })
}
