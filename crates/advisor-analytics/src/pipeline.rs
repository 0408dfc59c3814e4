//! 분석 파이프라인.
//!
//! 지표 → 구조 → 예측 → 추천 순서로 네 단계를 연결합니다.
//! 각 호출은 독립적이며 공유 가변 상태가 없으므로 여러 종목/기간을
//! 병렬로 분석할 수 있습니다.

use advisor_core::{
    analysis_span, AdvisorConfig, AdvisorResult, AnalysisReport, Horizon, PriceSeries,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::indicators::IndicatorCalculator;
use crate::projection::ProjectionEngine;
use crate::recommendation::{ExternalScores, RecommendationScorer, ScoringInput};
use crate::signals::MarketSignals;
use crate::structure::StructureDetector;

/// 분석 요청.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub horizon: Horizon,
    #[serde(default)]
    pub external: ExternalScores,
    /// 몬테카를로 시드. 없으면 호출마다 새 시드.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl AnalysisRequest {
    /// 예측 기간(일)으로 요청을 만듭니다. 1 ~ 90 범위 밖이면 `InvalidParameter`.
    pub fn new(horizon_days: u32) -> AdvisorResult<Self> {
        Ok(Self {
            horizon: Horizon::new(horizon_days)?,
            external: ExternalScores::none(),
            seed: None,
        })
    }

    pub fn with_external(mut self, external: ExternalScores) -> Self {
        self.external = external;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 계산 전에 요청 전체를 검증합니다.
    pub fn validate(&self) -> AdvisorResult<()> {
        Horizon::new(self.horizon.days())?;
        self.external.validate()
    }
}

/// 네 단계 분석 파이프라인.
#[derive(Debug)]
pub struct AnalysisPipeline {
    config: AdvisorConfig,
    indicators: IndicatorCalculator,
    structure: StructureDetector,
    projection: ProjectionEngine,
    scorer: RecommendationScorer,
    signals: MarketSignals,
}

impl AnalysisPipeline {
    /// 설정을 검증하고 파이프라인을 생성합니다.
    pub fn new(config: AdvisorConfig) -> AdvisorResult<Self> {
        config.validate()?;
        Ok(Self {
            indicators: IndicatorCalculator::new(config.indicators.clone()),
            structure: StructureDetector::new(config.structure.clone()),
            projection: ProjectionEngine::new(&config.projection, config.structure.window),
            scorer: RecommendationScorer::new(config.scoring.clone()),
            signals: MarketSignals::new(),
            config,
        })
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// 한 종목을 분석합니다.
    ///
    /// 요청 검증이 실패하면 어떤 계산도 하지 않고 거부합니다.
    pub fn analyze(&self, series: &PriceSeries, request: &AnalysisRequest) -> AdvisorResult<AnalysisReport> {
        request.validate()?;

        let span = analysis_span!("analyze", series.symbol(), request.horizon);
        let _guard = span.enter();

        let indicators = self.indicators.calculate(series)?;
        let unavailable = indicators.unavailable();
        if !unavailable.is_empty() {
            warn!(count = unavailable.len(), "일부 지표 사용 불가: 데이터 부족");
        }

        let structure = self.structure.detect(series);

        let closes = series.closes_f64();
        let projection = self
            .projection
            .project(&closes, &structure, request.horizon, request.seed)?;
        debug!(
            ensemble = projection.ensemble.projected_price,
            methods = projection.methods.len(),
            omitted = projection.omitted.len(),
            "예측 단계 완료"
        );

        let external = self.resolve_external(series, request.external);
        let recommendation = self.scorer.score(&ScoringInput {
            indicators: &indicators,
            structure: &structure,
            projection: &projection,
            external,
            current_price: series.current_price(),
        })?;

        info!(
            label = %recommendation.label,
            actionable = recommendation.is_actionable(),
            score = recommendation.overall_score,
            target = %recommendation.target_price,
            stop = %recommendation.stop_loss,
            "분석 완료"
        );

        Ok(AnalysisReport {
            symbol: series.symbol().to_string(),
            as_of: series.last().date,
            indicators,
            structure,
            projection,
            recommendation,
        })
    }

    /// 여러 분석을 병렬로 실행합니다. 결과는 입력 순서를 따릅니다.
    pub fn analyze_batch(&self, jobs: &[(PriceSeries, AnalysisRequest)]) -> Vec<AdvisorResult<AnalysisReport>> {
        jobs.par_iter()
            .map(|(series, request)| self.analyze(series, request))
            .collect()
    }

    /// 설정에 따라 빠진 모멘텀/거래량 점수를 시계열에서 도출합니다.
    fn resolve_external(&self, series: &PriceSeries, external: ExternalScores) -> ExternalScores {
        if !self.config.pipeline.derive_market_signals {
            return external;
        }
        ExternalScores {
            ml: external.ml,
            momentum: external.momentum.or_else(|| self.signals.momentum_score(series)),
            volume: external.volume.or_else(|| self.signals.volume_score(series)),
        }
    }
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self {
            config: AdvisorConfig::default(),
            indicators: IndicatorCalculator::default(),
            structure: StructureDetector::default(),
            projection: ProjectionEngine::default(),
            scorer: RecommendationScorer::default(),
            signals: MarketSignals::new(),
        }
    }
}
