//! 임의 시계열에 대한 속성 테스트
//!
//! 지표 범위, 앙상블 범위, 점수 범위와 결정 규칙, 시드 재현성을 검증합니다.

use advisor_analytics::{
    AnalysisPipeline, AnalysisRequest, ExternalScores, IndicatorCalculator, ProjectionEngine,
    StructureDetector,
};
use advisor_core::{Bar, Decision, Horizon, IndicatorName, PriceSeries};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// (일간 변화율, 고가 여유, 저가 여유, 거래량) 목록으로 시계열 생성
fn build_series(steps: &[(f64, f64, f64, u32)]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut close = 100.0_f64;
    let bars = steps
        .iter()
        .enumerate()
        .map(|(i, &(change, up, down, volume))| {
            close = (close * (1.0 + change)).max(1.0);
            let to_dec = |v: f64| Decimal::try_from(v).unwrap().round_dp(4);
            let c = to_dec(close);
            let high = to_dec(close * (1.0 + up)).max(c);
            let low = to_dec(close * (1.0 - down)).min(c);
            Bar::new(
                start + chrono::Duration::days(i as i64),
                c,
                high,
                low,
                c,
                Decimal::from(volume),
            )
        })
        .collect();
    PriceSeries::new("PROP", bars).unwrap()
}

fn steps_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<(f64, f64, f64, u32)>> {
    prop::collection::vec(
        (-0.05f64..0.05, 0.0f64..0.03, 0.0f64..0.03, 0u32..1_000_000),
        min..max,
    )
}

fn score_strategy() -> impl Strategy<Value = Option<f64>> {
    prop::option::of(0.0f64..=100.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn indicator_values_stay_in_bounds(steps in steps_strategy(10, 150)) {
        let series = build_series(&steps);
        let set = IndicatorCalculator::default().calculate(&series).unwrap();

        for (name, value, _) in set.available() {
            match name {
                IndicatorName::Rsi14
                | IndicatorName::StochasticK
                | IndicatorName::StochasticD
                | IndicatorName::Mfi14 => {
                    prop_assert!(value >= dec!(0) && value <= dec!(100), "{} = {}", name, value);
                }
                IndicatorName::WilliamsR => {
                    prop_assert!(value >= dec!(-100) && value <= dec!(0), "%R = {}", value);
                }
                IndicatorName::Atr14 => prop_assert!(value >= dec!(0)),
                IndicatorName::ParabolicSar | IndicatorName::Sma20 | IndicatorName::Sma50 => {
                    prop_assert!(value > dec!(0));
                }
                _ => {}
            }
        }
    }

    #[test]
    fn ensemble_within_method_range(steps in steps_strategy(20, 130), days in 1u32..=90, seed in any::<u64>()) {
        let series = build_series(&steps);
        let structure = StructureDetector::default().detect(&series);
        let result = ProjectionEngine::default()
            .project(&series.closes_f64(), &structure, Horizon::new(days).unwrap(), Some(seed))
            .unwrap();

        let prices: Vec<f64> = result.methods.values().map(|m| m.projected_price).collect();
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let ensemble = result.ensemble.projected_price;

        prop_assert!(ensemble.is_finite());
        prop_assert!(ensemble >= min && ensemble <= max, "{} not in [{}, {}]", ensemble, min, max);
        for projection in result.methods.values() {
            prop_assert!(projection.projected_price > 0.0);
            prop_assert!(projection.band.low <= projection.band.high);
            prop_assert_eq!(projection.path.len(), days as usize);
        }
    }

    #[test]
    fn score_bounds_and_decision_rule(
        steps in steps_strategy(40, 120),
        ml in score_strategy(),
        momentum in score_strategy(),
        volume in score_strategy(),
        seed in any::<u64>(),
    ) {
        let series = build_series(&steps);
        let request = AnalysisRequest::new(10)
            .unwrap()
            .with_external(ExternalScores::new(ml, momentum, volume))
            .with_seed(seed);
        let rec = AnalysisPipeline::default().analyze(&series, &request).unwrap().recommendation;

        prop_assert!((0.0..=100.0).contains(&rec.overall_score));
        for score in rec.component_scores.values() {
            prop_assert!((0.0..=100.0).contains(score));
        }
        let weight_sum: f64 = rec.weights_used.values().sum();
        prop_assert!((weight_sum - 1.0).abs() < 1e-9);

        let expected = if rec.overall_score >= 65.0 {
            Decision::Buy
        } else if rec.overall_score <= 35.0 {
            Decision::Sell
        } else {
            Decision::Hold
        };
        prop_assert_eq!(rec.label, expected);
        prop_assert!(rec.risk_reward_ratio >= 0.0);
        prop_assert!(rec.stop_loss > Decimal::ZERO);
        prop_assert!(rec.stop_loss != rec.current_price);
    }

    #[test]
    fn seeded_analysis_is_reproducible(steps in steps_strategy(40, 100), seed in any::<u64>()) {
        let series = build_series(&steps);
        let request = AnalysisRequest::new(20)
            .unwrap()
            .with_external(ExternalScores::none().with_ml(55.0))
            .with_seed(seed);
        let pipeline = AnalysisPipeline::default();

        let first = pipeline.analyze(&series, &request).unwrap();
        let second = pipeline.analyze(&series, &request).unwrap();
        prop_assert_eq!(first.recommendation.risk_reward_ratio, second.recommendation.risk_reward_ratio);
        prop_assert_eq!(first, second);
    }
}
