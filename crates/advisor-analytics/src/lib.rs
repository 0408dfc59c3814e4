//! 기술적 분석 추천 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 기술적 지표 (RSI, MACD, 스토캐스틱, 볼린저 밴드 등)
//! - 지지/저항 수준과 차트 패턴 감지
//! - 추세/이동평균/지지저항/몬테카를로 가격 예측과 앙상블
//! - 가중 점수 기반 매매 추천
//! - 위 단계를 묶은 분석 파이프라인 (병렬 일괄 분석 포함)
//!
//! # 예시
//!
//! ```no_run
//! use advisor_analytics::{AnalysisPipeline, AnalysisRequest};
//! use advisor_core::{AdvisorConfig, PriceSeries};
//!
//! # fn run(series: PriceSeries) -> advisor_core::AdvisorResult<()> {
//! let pipeline = AnalysisPipeline::new(AdvisorConfig::default())?;
//! let report = pipeline.analyze(&series, &AnalysisRequest::new(10)?)?;
//! println!("{} {:.1}", report.recommendation.label, report.recommendation.overall_score);
//! # Ok(())
//! # }
//! ```

pub mod indicators;
pub mod pipeline;
pub mod projection;
pub mod recommendation;
pub mod signals;
pub mod stats;
pub mod structure;

// Indicators 모듈 re-exports
pub use indicators::{
    AtrParams,
    // 변동성 지표
    BollingerBandsParams,
    BollingerBandsResult,
    CciParams,
    EmaParams,
    HistoricalVolatilityParams,
    IndicatorCalculator,
    IndicatorEngine,
    IndicatorError,
    IndicatorResult,
    MacdParams,
    MacdResult,
    MfiParams,
    MomentumCalculator,
    // 거래량 지표
    ObvResult,
    PsarParams,
    // 모멘텀 지표
    RsiParams,
    // 추세 지표
    SmaParams,
    StochasticParams,
    StochasticResult,
    TrendIndicators,
    VolatilityIndicators,
    VolumeIndicators,
    WilliamsParams,
};

// 구조 감지 re-export
pub use structure::StructureDetector;

// 예측 re-exports
pub use projection::{
    MonteCarloProjector, MovingAverageProjector, ProjectionContext, ProjectionEngine, Projector,
    SupportResistanceProjector, TrendProjector,
};

// 추천 re-exports
pub use recommendation::{ExternalScores, RecommendationScorer, ScoringInput};

pub use pipeline::{AnalysisPipeline, AnalysisRequest};
pub use signals::MarketSignals;
