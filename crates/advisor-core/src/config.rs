//! 설정 관리.
//!
//! 분석 엔진의 모든 고정 상수(지표 기간, 임계값, 가중치 등)를 명시적인
//! 설정 구조체로 정의합니다. 모든 구조체는 `Default`를 구현하며, 파일에는
//! 변경할 항목만 적으면 됩니다.

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::Component;
use crate::error::{AdvisorError, AdvisorResult};
use crate::logging::{LogConfig, LogFormat};

/// 환경 변수 오버라이드 접두사 (`ADVISOR__SCORING__BUY_THRESHOLD=70`).
pub const ENV_PREFIX: &str = "ADVISOR";

/// 가중치 합계 허용 오차.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// 분석 엔진 설정.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 지표 계산 설정
    pub indicators: IndicatorConfig,
    /// 구조 감지 설정
    pub structure: StructureConfig,
    /// 가격 예측 설정
    pub projection: ProjectionConfig,
    /// 추천 점수 설정
    pub scoring: ScoringConfig,
    /// 파이프라인 설정
    pub pipeline: PipelineConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    /// 로깅 초기화용 설정으로 변환합니다.
    pub fn to_log_config(&self) -> AdvisorResult<LogConfig> {
        let format: LogFormat = self.format.parse()?;
        let config = LogConfig::new(self.level.clone()).with_format(format);
        config.filter()?;
        Ok(config)
    }
}

/// 지표 계산 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub rsi_overbought: Decimal,
    pub rsi_oversold: Decimal,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub stochastic_k: usize,
    pub stochastic_d: usize,
    pub stochastic_overbought: Decimal,
    pub stochastic_oversold: Decimal,
    pub williams_period: usize,
    /// Williams %R은 음수 관례(-100 ~ 0)를 사용합니다.
    pub williams_overbought: Decimal,
    pub williams_oversold: Decimal,
    pub cci_period: usize,
    /// CCI 임계값 (±)
    pub cci_threshold: Decimal,
    pub atr_period: usize,
    pub psar_step: Decimal,
    pub psar_max: Decimal,
    pub mfi_period: usize,
    pub mfi_overbought: Decimal,
    pub mfi_oversold: Decimal,
    pub bollinger_period: usize,
    pub bollinger_std_dev: Decimal,
    pub sma_short: usize,
    pub sma_long: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_overbought: dec!(70),
            rsi_oversold: dec!(30),
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            stochastic_k: 14,
            stochastic_d: 3,
            stochastic_overbought: dec!(80),
            stochastic_oversold: dec!(20),
            williams_period: 14,
            williams_overbought: dec!(-20),
            williams_oversold: dec!(-80),
            cci_period: 20,
            cci_threshold: dec!(100),
            atr_period: 14,
            psar_step: dec!(0.02),
            psar_max: dec!(0.2),
            mfi_period: 14,
            mfi_overbought: dec!(80),
            mfi_oversold: dec!(20),
            bollinger_period: 20,
            bollinger_std_dev: dec!(2),
            sma_short: 20,
            sma_long: 50,
        }
    }
}

/// 구조 감지 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StructureConfig {
    /// 극값 탐색 윈도우 W
    pub window: usize,
    /// 레벨 군집 상대 허용 오차
    pub cluster_tolerance: f64,
    /// 쌍봉/쌍바닥 높이 허용 오차
    pub pattern_tolerance: f64,
    /// 삼각형 판정 시 평탄 기울기 (봉당 비율)
    pub flat_slope: f64,
    /// 깃발 폴 최소 수익률
    pub flag_pole_threshold: f64,
    /// 깃발 횡보 구간 최대 수익률 표준편차
    pub flag_max_std: f64,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            window: 20,
            cluster_tolerance: 0.015,
            pattern_tolerance: 0.02,
            flat_slope: 0.001,
            flag_pole_threshold: 0.05,
            flag_max_std: 0.02,
        }
    }
}

/// 가격 예측 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// 추세 회귀 최대 룩백
    pub trend_lookback: usize,
    /// 추세 회귀 최소 봉 수
    pub trend_min_bars: usize,
    /// 단기 이동평균 기간
    pub ma_short: usize,
    /// 장기 이동평균 기간
    pub ma_long: usize,
    /// 신뢰 구간 z값 (0.9 분위수)
    pub band_z: f64,
    /// 지지/저항 진동 감쇠율
    pub oscillation_damping: f64,
    /// 몬테카를로 경로 수
    pub monte_carlo_paths: usize,
    /// 몬테카를로 최소 봉 수
    pub monte_carlo_min_bars: usize,
    /// 일간 변동성 하한 (0 변동성 대체값)
    pub min_daily_volatility: f64,
    /// 연간 거래일 수
    pub trading_days_per_year: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            trend_lookback: 60,
            trend_min_bars: 5,
            ma_short: 10,
            ma_long: 50,
            band_z: 1.2816,
            oscillation_damping: 0.85,
            monte_carlo_paths: 1000,
            monte_carlo_min_bars: 20,
            min_daily_volatility: 1e-4,
            trading_days_per_year: 252.0,
        }
    }
}

/// 구성 요소 가중치.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ComponentWeights {
    pub technical: f64,
    pub ml: f64,
    pub momentum: f64,
    pub risk: f64,
    pub volume: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            technical: 0.25,
            ml: 0.20,
            momentum: 0.20,
            risk: 0.15,
            volume: 0.20,
        }
    }
}

impl ComponentWeights {
    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Technical => self.technical,
            Component::Ml => self.ml,
            Component::Momentum => self.momentum,
            Component::Risk => self.risk,
            Component::Volume => self.volume,
        }
    }

    pub fn sum(&self) -> f64 {
        Component::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// 주어진 구성 요소만으로 합계 1이 되도록 재정규화합니다.
    ///
    /// 가중치 합이 0이면 `None`.
    pub fn renormalized(&self, present: &[Component]) -> Option<BTreeMap<Component, f64>> {
        let total: f64 = present.iter().map(|c| self.get(*c)).sum();
        if total <= 0.0 {
            return None;
        }
        Some(present.iter().map(|c| (*c, self.get(*c) / total)).collect())
    }
}

/// 추천 점수 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// 이 점수 이상이면 Buy
    pub buy_threshold: f64,
    /// 이 점수 이하이면 Sell
    pub sell_threshold: f64,
    /// 구성 요소 점수 표준편차가 이 값 미만이면 High
    pub high_confidence_std: f64,
    /// 구성 요소 점수 표준편차가 이 값 미만이면 Medium
    pub medium_confidence_std: f64,
    /// 손절 ATR 배수
    pub stop_atr_multiple: f64,
    /// 신뢰도별 목표가 레벨 당김 비율
    pub target_pull_high: f64,
    pub target_pull_medium: f64,
    pub target_pull_low: f64,
    /// ATR 하한 (가격 대비 비율)
    pub min_atr_pct: f64,
    /// 지표 신호 하나당 기술 점수 증감
    pub technical_step: f64,
    /// 패턴 신뢰도 1.0당 기술 점수 증감
    pub pattern_weight: f64,
    /// ATR% 1당 변동성 점수 감점
    pub atr_pct_penalty: f64,
    /// 근접도 점수 만점 기준 거리 (ATR 단위)
    pub proximity_atr_units: f64,
    /// 구성 요소 가중치 (합계 1)
    pub weights: ComponentWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            buy_threshold: 65.0,
            sell_threshold: 35.0,
            high_confidence_std: 10.0,
            medium_confidence_std: 20.0,
            stop_atr_multiple: 1.5,
            target_pull_high: 0.5,
            target_pull_medium: 0.3,
            target_pull_low: 0.1,
            min_atr_pct: 0.005,
            technical_step: 8.0,
            pattern_weight: 15.0,
            atr_pct_penalty: 12.5,
            proximity_atr_units: 3.0,
            weights: ComponentWeights::default(),
        }
    }
}

/// 파이프라인 설정.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 외부 모멘텀/거래량 점수가 없을 때 시계열에서 도출할지 여부
    pub derive_market_signals: bool,
}

fn check(condition: bool, message: impl FnOnce() -> String) -> AdvisorResult<()> {
    if condition {
        Ok(())
    } else {
        Err(AdvisorError::Config(message()))
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> AdvisorResult<()> {
        for (name, period) in [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_signal", self.macd_signal),
            ("stochastic_k", self.stochastic_k),
            ("stochastic_d", self.stochastic_d),
            ("williams_period", self.williams_period),
            ("cci_period", self.cci_period),
            ("atr_period", self.atr_period),
            ("mfi_period", self.mfi_period),
            ("bollinger_period", self.bollinger_period),
            ("sma_short", self.sma_short),
        ] {
            check(period > 0, || format!("{}는 0보다 커야 합니다", name))?;
        }
        check(self.macd_fast < self.macd_slow, || {
            "macd_fast는 macd_slow보다 작아야 합니다".to_string()
        })?;
        check(self.sma_short < self.sma_long, || {
            "sma_short는 sma_long보다 작아야 합니다".to_string()
        })?;
        check(self.rsi_oversold < self.rsi_overbought, || {
            "RSI 과매도 임계값이 과매수 임계값보다 작아야 합니다".to_string()
        })?;
        check(self.stochastic_oversold < self.stochastic_overbought, || {
            "스토캐스틱 임계값 순서가 잘못되었습니다".to_string()
        })?;
        check(self.mfi_oversold < self.mfi_overbought, || {
            "MFI 임계값 순서가 잘못되었습니다".to_string()
        })?;
        check(
            self.williams_oversold < self.williams_overbought
                && self.williams_overbought <= Decimal::ZERO
                && self.williams_oversold >= dec!(-100),
            || "Williams %R 임계값은 -100 ~ 0 범위여야 합니다".to_string(),
        )?;
        check(self.cci_threshold > Decimal::ZERO, || {
            "cci_threshold는 0보다 커야 합니다".to_string()
        })?;
        check(
            self.psar_step > Decimal::ZERO && self.psar_step <= self.psar_max,
            || "psar_step은 0보다 크고 psar_max 이하여야 합니다".to_string(),
        )?;
        check(self.bollinger_std_dev > Decimal::ZERO, || {
            "bollinger_std_dev는 0보다 커야 합니다".to_string()
        })
    }
}

impl StructureConfig {
    pub fn validate(&self) -> AdvisorResult<()> {
        check(self.window >= 2, || "구조 윈도우는 2 이상이어야 합니다".to_string())?;
        for (name, value) in [
            ("cluster_tolerance", self.cluster_tolerance),
            ("pattern_tolerance", self.pattern_tolerance),
            ("flat_slope", self.flat_slope),
            ("flag_pole_threshold", self.flag_pole_threshold),
            ("flag_max_std", self.flag_max_std),
        ] {
            check(value.is_finite() && value > 0.0, || {
                format!("{}는 0보다 커야 합니다: {}", name, value)
            })?;
        }
        Ok(())
    }
}

impl ProjectionConfig {
    pub fn validate(&self) -> AdvisorResult<()> {
        check(self.trend_min_bars >= 3, || {
            "trend_min_bars는 3 이상이어야 합니다".to_string()
        })?;
        check(self.trend_lookback >= self.trend_min_bars, || {
            "trend_lookback은 trend_min_bars 이상이어야 합니다".to_string()
        })?;
        check(self.ma_short > 0 && self.ma_short < self.ma_long, || {
            "ma_short는 0보다 크고 ma_long보다 작아야 합니다".to_string()
        })?;
        check(self.band_z.is_finite() && self.band_z >= 0.0, || {
            "band_z는 0 이상이어야 합니다".to_string()
        })?;
        check(
            self.oscillation_damping > 0.0 && self.oscillation_damping <= 1.0,
            || "oscillation_damping은 (0, 1] 범위여야 합니다".to_string(),
        )?;
        check(self.monte_carlo_paths > 0, || {
            "monte_carlo_paths는 0보다 커야 합니다".to_string()
        })?;
        check(self.monte_carlo_min_bars >= 2, || {
            "monte_carlo_min_bars는 2 이상이어야 합니다".to_string()
        })?;
        check(
            self.min_daily_volatility.is_finite() && self.min_daily_volatility > 0.0,
            || "min_daily_volatility는 0보다 커야 합니다".to_string(),
        )?;
        check(self.trading_days_per_year > 0.0, || {
            "trading_days_per_year는 0보다 커야 합니다".to_string()
        })
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> AdvisorResult<()> {
        for component in Component::ALL {
            let w = self.weights.get(component);
            check(w.is_finite() && w >= 0.0, || {
                format!("{} 가중치는 0 이상이어야 합니다: {}", component, w)
            })?;
        }
        let sum = self.weights.sum();
        check((sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE, || {
            format!("가중치 합계는 1이어야 합니다: {}", sum)
        })?;
        check(
            0.0 <= self.sell_threshold
                && self.sell_threshold < self.buy_threshold
                && self.buy_threshold <= 100.0,
            || {
                format!(
                    "임계값은 0 <= sell({}) < buy({}) <= 100 이어야 합니다",
                    self.sell_threshold, self.buy_threshold
                )
            },
        )?;
        check(
            0.0 < self.high_confidence_std && self.high_confidence_std < self.medium_confidence_std,
            || "신뢰도 표준편차 임계값은 0 < high < medium 이어야 합니다".to_string(),
        )?;
        check(self.stop_atr_multiple > 0.0, || {
            "stop_atr_multiple은 0보다 커야 합니다".to_string()
        })?;
        for (name, pull) in [
            ("target_pull_high", self.target_pull_high),
            ("target_pull_medium", self.target_pull_medium),
            ("target_pull_low", self.target_pull_low),
        ] {
            check((0.0..=1.0).contains(&pull), || {
                format!("{}는 0 ~ 1 범위여야 합니다: {}", name, pull)
            })?;
        }
        check(self.min_atr_pct > 0.0 && self.min_atr_pct < 1.0, || {
            "min_atr_pct는 (0, 1) 범위여야 합니다".to_string()
        })?;
        check(
            self.technical_step >= 0.0 && self.pattern_weight >= 0.0 && self.atr_pct_penalty >= 0.0,
            || "기술/리스크 점수 계수는 음수일 수 없습니다".to_string(),
        )?;
        check(self.proximity_atr_units > 0.0, || {
            "proximity_atr_units는 0보다 커야 합니다".to_string()
        })
    }

    /// 신뢰도별 목표가 당김 비율.
    pub fn target_pull(&self, confidence: crate::domain::ConfidenceLevel) -> f64 {
        use crate::domain::ConfidenceLevel;
        match confidence {
            ConfidenceLevel::High => self.target_pull_high,
            ConfidenceLevel::Medium => self.target_pull_medium,
            ConfidenceLevel::Low => self.target_pull_low,
        }
    }
}

impl AdvisorConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> AdvisorResult<Self> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 로드합니다.
    pub fn from_toml_str(content: &str) -> AdvisorResult<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 모든 하위 설정을 검증합니다.
    pub fn validate(&self) -> AdvisorResult<()> {
        self.logging.to_log_config()?;
        self.indicators.validate()?;
        self.structure.validate()?;
        self.projection.validate()?;
        self.scoring.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AdvisorConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.scoring.weights.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut scoring = ScoringConfig::default();
        scoring.weights.technical = 0.5;
        let err = scoring.validate().unwrap_err();
        assert!(matches!(err, AdvisorError::Config(_)));
    }

    #[test]
    fn test_thresholds_order() {
        let scoring = ScoringConfig {
            buy_threshold: 30.0,
            sell_threshold: 40.0,
            ..Default::default()
        };
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_renormalized_weights() {
        let weights = ComponentWeights::default();
        let used = weights
            .renormalized(&[Component::Technical, Component::Risk])
            .unwrap();
        assert!((used[&Component::Technical] - 0.25 / 0.40).abs() < 1e-12);
        assert!((used.values().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(weights.renormalized(&[]).is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config = AdvisorConfig::from_toml_str(
            r#"
            [scoring]
            buy_threshold = 70.0

            [structure]
            window = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.scoring.buy_threshold, 70.0);
        assert_eq!(config.scoring.sell_threshold, 35.0);
        assert_eq!(config.structure.window, 30);
        assert_eq!(config.projection, ProjectionConfig::default());
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = AdvisorConfig::from_toml_str(
            r#"
            [projection]
            ma_short = 60
            "#,
        );
        assert!(matches!(result, Err(AdvisorError::Config(_))));

        let result = AdvisorConfig::from_toml_str(
            r#"
            [logging]
            format = "xml"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_serialized_default_round_trips() {
        let text = toml::to_string(&AdvisorConfig::default()).unwrap();
        let config = AdvisorConfig::from_toml_str(&text).unwrap();
        assert_eq!(config, AdvisorConfig::default());
    }
}
