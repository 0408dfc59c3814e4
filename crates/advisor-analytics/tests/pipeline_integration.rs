//! 분석 파이프라인 통합 테스트
//!
//! 고정 시나리오: 선형 추세 예측, 최소 윈도우 경계, 무변동 시계열,
//! 입력 거부, 일괄 분석, 평면 레코드 출력.

use advisor_analytics::{AnalysisPipeline, AnalysisRequest, ExternalScores, ProjectionEngine};
use advisor_core::{
    AdvisorConfig, AdvisorError, Bar, Component, FlatRecord, Horizon, IndicatorName,
    ProjectionMethod, PriceSeries, StructureLevels,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

fn series_from(closes: &[Decimal]) -> PriceSeries {
    PriceSeries::from_closes("TEST", start(), closes).unwrap()
}

/// 일정한 기울기의 상승 시계열
fn linear(n: usize, base: i64, slope: i64) -> PriceSeries {
    let closes: Vec<Decimal> = (0..n).map(|i| Decimal::from(base + slope * i as i64)).collect();
    series_from(&closes)
}

/// 고가/저가가 있는 박스권 시계열 (피크와 저점이 반복)
fn ranging(n: usize) -> PriceSeries {
    let bars = (0..n)
        .map(|i| {
            let phase = (i % 30) as i64;
            let offset = if phase < 15 { phase } else { 30 - phase };
            let close = Decimal::from(90 + offset);
            Bar::new(
                start() + chrono::Duration::days(i as i64),
                close,
                close + dec!(1),
                close - dec!(1),
                close,
                Decimal::from(10_000 + (i as i64 % 7) * 500),
            )
        })
        .collect();
    PriceSeries::new("RANGE", bars).unwrap()
}

#[test]
fn test_trend_projection_example() {
    let closes = [100.0, 102.0, 104.0, 106.0, 108.0, 110.0];
    let result = ProjectionEngine::default()
        .project(&closes, &StructureLevels::empty(), Horizon::new(5).unwrap(), Some(7))
        .unwrap();

    let trend = result.get(ProjectionMethod::Trend).unwrap();
    assert!((trend.projected_price - 120.0).abs() < 1e-9);
    // 다른 방법은 데이터 부족으로 생략되어 앙상블 = 추세
    assert!(result.is_omitted(ProjectionMethod::MovingAverage));
    assert!(result.is_omitted(ProjectionMethod::MonteCarlo));
    assert!(result.is_omitted(ProjectionMethod::SupportResistance));
    assert!((result.ensemble.projected_price - 120.0).abs() < 1e-9);
}

#[test]
fn test_trend_example_through_pipeline() {
    let series = series_from(&[dec!(100), dec!(102), dec!(104), dec!(106), dec!(108), dec!(110)]);
    let request = AnalysisRequest::new(5)
        .unwrap()
        .with_external(ExternalScores::new(Some(60.0), Some(60.0), None));
    let report = AnalysisPipeline::default().analyze(&series, &request).unwrap();

    assert_eq!(report.as_of, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
    assert!(report.indicators.unavailable().contains(&IndicatorName::Macd));
    // 짧은 시계열: Parabolic SAR만 계산되고 ATR이 없어 리스크는 제외
    assert!(report.indicators.is_available(IndicatorName::ParabolicSar));
    let excluded = &report.recommendation.excluded_components;
    assert!(excluded.contains(&Component::Risk));
    assert!(excluded.contains(&Component::Volume));
    assert!(!excluded.contains(&Component::Technical));
    assert_eq!(report.recommendation.horizon_days, 5);
}

#[test]
fn test_macd_minimum_window_boundary() {
    let pipeline = AnalysisPipeline::default();
    let request = AnalysisRequest::new(5).unwrap().with_seed(1);

    let short = pipeline.analyze(&linear(33, 100, 1), &request).unwrap();
    assert!(!short.indicators.is_available(IndicatorName::Macd));
    assert!(!short.indicators.is_available(IndicatorName::MacdSignal));
    assert!(short.indicators.is_available(IndicatorName::Rsi14));
    // MACD 없이도 기술적 점수는 계산됨
    assert!(short
        .recommendation
        .component_score(Component::Technical)
        .is_some());

    let enough = pipeline.analyze(&linear(34, 100, 1), &request).unwrap();
    assert!(enough.indicators.is_available(IndicatorName::Macd));
}

#[test]
fn test_zero_volatility_series() {
    let series = linear(120, 100, 1);
    let current = 219.0;
    let request = AnalysisRequest::new(10).unwrap().with_seed(42);
    let report = AnalysisPipeline::default().analyze(&series, &request).unwrap();
    let projection = &report.projection;

    let trend = projection.get(ProjectionMethod::Trend).unwrap();
    assert!((trend.projected_price - (current + 10.0)).abs() < 1e-6);
    assert!(trend.band.width() < 1e-6);

    let ma = projection.get(ProjectionMethod::MovingAverage).unwrap();
    assert!(ma.band.width() < 1e-6);

    // 극값이 없으므로 지지/저항 예측 생략
    assert!(projection.is_omitted(ProjectionMethod::SupportResistance));
    assert!(projection.ensemble.band.width() / current < 0.01);
}

#[test]
fn test_flat_series_does_not_divide_by_zero() {
    let series = series_from(&vec![dec!(50); 80]);
    let request = AnalysisRequest::new(15).unwrap().with_seed(9);
    let report = AnalysisPipeline::default().analyze(&series, &request).unwrap();
    let rec = &report.recommendation;

    assert!(rec.overall_score.is_finite());
    assert!(rec.risk_reward_ratio.is_finite());
    assert_ne!(rec.stop_loss, rec.current_price);
    for projection in report.projection.methods.values() {
        assert!((projection.projected_price - 50.0).abs() < 0.5);
    }
}

#[test]
fn test_long_gain_run_after_single_drop() {
    let mut closes = vec![dec!(10000), dec!(9990)];
    closes.extend((1..1200).map(|i| dec!(9990) + Decimal::from(50 * i)));
    let series = series_from(&closes);
    let request = AnalysisRequest::new(10).unwrap().with_seed(11);
    let report = AnalysisPipeline::default().analyze(&series, &request).unwrap();

    let rsi = report.indicators.value(IndicatorName::Rsi14).unwrap();
    assert!(rsi > dec!(99.9) && rsi <= dec!(100));
    assert!((0.0..=100.0).contains(&report.recommendation.overall_score));
}

#[test]
fn test_ranging_series_detects_structure() {
    let series = ranging(120);
    let request = AnalysisRequest::new(10)
        .unwrap()
        .with_external(ExternalScores::new(Some(50.0), Some(50.0), Some(50.0)))
        .with_seed(5);
    let report = AnalysisPipeline::default().analyze(&series, &request).unwrap();

    assert!(!report.structure.levels.is_empty());
    assert!(report.structure.supports().count() > 0);
    assert!(report.structure.resistances().count() > 0);
    assert!(report.recommendation.excluded_components.is_empty());
    assert!(!report.recommendation.rationale.is_empty());
}

#[test]
fn test_invalid_inputs_are_rejected() {
    assert!(matches!(
        AnalysisRequest::new(91).unwrap_err(),
        AdvisorError::InvalidParameter(_)
    ));

    let pipeline = AnalysisPipeline::default();
    let request = AnalysisRequest::new(5)
        .unwrap()
        .with_external(ExternalScores::none().with_volume(-3.0));
    let err = pipeline.analyze(&linear(60, 100, 1), &request).unwrap_err();
    assert!(err.is_rejection());

    let bars = vec![
        Bar::flat(start(), dec!(10), dec!(0)),
        Bar::flat(start(), dec!(11), dec!(0)),
    ];
    let err = PriceSeries::new("DUP", bars).unwrap_err();
    assert!(matches!(err, AdvisorError::MalformedSeries(_)));
}

#[test]
fn test_rationale_uses_configured_rsi_bands() {
    let series = linear(60, 100, 1);
    let request = AnalysisRequest::new(5).unwrap().with_seed(2);

    let report = AnalysisPipeline::default().analyze(&series, &request).unwrap();
    assert!(report.recommendation.rationale.iter().any(|r| r.contains("과매수")));

    let mut config = AdvisorConfig::default();
    config.indicators.rsi_overbought = dec!(100);
    let report = AnalysisPipeline::new(config).unwrap().analyze(&series, &request).unwrap();
    assert!(report.recommendation.rationale.iter().all(|r| !r.contains("RSI")));
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = AdvisorConfig::default();
    config.scoring.buy_threshold = 30.0;
    assert!(AnalysisPipeline::new(config).is_err());
}

#[test]
fn test_batch_analysis_matches_sequential() {
    let pipeline = AnalysisPipeline::default();
    let jobs: Vec<(PriceSeries, AnalysisRequest)> = (0..6u64)
        .map(|i| {
            let request = AnalysisRequest::new(5 + i as u32 * 10).unwrap().with_seed(i);
            (linear(60 + i as usize * 5, 100, 1), request)
        })
        .collect();

    let batch = pipeline.analyze_batch(&jobs);
    assert_eq!(batch.len(), jobs.len());
    for ((series, request), result) in jobs.iter().zip(&batch) {
        let sequential = pipeline.analyze(series, request).unwrap();
        assert_eq!(result.as_ref().unwrap(), &sequential);
    }
}

#[test]
fn test_report_flat_record() {
    let request = AnalysisRequest::new(10).unwrap().with_seed(3);
    let report = AnalysisPipeline::default().analyze(&linear(70, 100, 1), &request).unwrap();
    let record = report.flat_record();

    assert_eq!(record["symbol"], Value::String("TEST".to_string()));
    assert!(record.contains_key("recommendation.label"));
    assert!(record.contains_key("projection.horizon_days"));
    assert!(record.values().all(|v| !v.is_array() && !v.is_object()));
}
