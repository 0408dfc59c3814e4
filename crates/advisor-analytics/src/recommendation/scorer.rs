//! 추천 점수 계산기.
//!
//! # 구성 요소
//!
//! | 구성 요소 | 출처 | 기본 가중치 |
//! |---|---|---|
//! | Technical | 지표 상태 + 차트 패턴 | 0.25 |
//! | Ml | 외부 ML 점수 | 0.20 |
//! | Momentum | 외부 모멘텀 점수 | 0.20 |
//! | Risk | ATR 변동성 + 반대 레벨 근접도 | 0.15 |
//! | Volume | 외부 거래량 점수 | 0.20 |
//!
//! 값이 없는 구성 요소는 제외하고 나머지 가중치를 합계 1로 재정규화합니다.

use std::collections::BTreeMap;

use advisor_core::{
    price_from_f64, AdvisorError, AdvisorResult, Component, ConfidenceLevel, Decision, DecimalExt,
    IndicatorName, IndicatorSet, Price, ProjectionResult, Recommendation, ScoringConfig,
    StructureLevels,
};
use rust_decimal::Decimal;
use tracing::debug;

use super::{rationale, ExternalScores};
use crate::stats;

/// 중립 점수.
const NEUTRAL_SCORE: f64 = 50.0;

/// 손절가 하한 (현재가 대비 비율).
const STOP_FLOOR_RATIO: f64 = 0.01;

/// 같은 신호를 공유하는 지표 묶음. 묶음마다 한 표를 행사합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SignalGroup {
    /// SMA-20, SMA-50, Parabolic SAR
    Trend,
    /// MACD 선, 시그널, 히스토그램
    Macd,
    /// %K, %D
    Stochastic,
    Single(IndicatorName),
}

impl SignalGroup {
    fn of(name: IndicatorName) -> Self {
        match name {
            IndicatorName::Sma20 | IndicatorName::Sma50 | IndicatorName::ParabolicSar => SignalGroup::Trend,
            IndicatorName::Macd | IndicatorName::MacdSignal | IndicatorName::MacdHistogram => SignalGroup::Macd,
            IndicatorName::StochasticK | IndicatorName::StochasticD => SignalGroup::Stochastic,
            other => SignalGroup::Single(other),
        }
    }
}

/// 점수 계산 입력.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub indicators: &'a IndicatorSet,
    pub structure: &'a StructureLevels,
    pub projection: &'a ProjectionResult,
    pub external: ExternalScores,
    pub current_price: Price,
}

/// 추천 점수 계산기.
#[derive(Debug, Clone, Default)]
pub struct RecommendationScorer {
    config: ScoringConfig,
}

impl RecommendationScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// 기술적 점수.
    ///
    /// 50에서 시작해 상승/과매도 신호마다 +step, 하락/과매수 신호마다 -step,
    /// 방향성 패턴마다 ±패턴 가중치 × 신뢰도를 더한 뒤 0 ~ 100으로 자릅니다.
    /// 추세(SMA-20/SMA-50/PSAR), MACD, 스토캐스틱 묶음은 구성 지표 방향의
    /// 평균으로 한 표만 행사합니다.
    /// 사용 가능한 지표와 패턴이 모두 없으면 `None`.
    pub fn technical_score(&self, indicators: &IndicatorSet, structure: &StructureLevels) -> Option<f64> {
        let mut available = 0usize;
        let mut score = NEUTRAL_SCORE;

        let mut votes: BTreeMap<SignalGroup, (i32, u32)> = BTreeMap::new();
        for (name, _, state) in indicators.available() {
            available += 1;
            if let Some(state) = state {
                let (sum, count) = votes.entry(SignalGroup::of(name)).or_default();
                *sum += state.direction();
                *count += 1;
            }
        }
        for (sum, count) in votes.values() {
            score += self.config.technical_step * f64::from(*sum) / f64::from(*count);
        }
        for pattern in &structure.patterns {
            score += self.config.pattern_weight * pattern.confidence * pattern.kind.bias().sign();
        }

        if available == 0 && structure.patterns.is_empty() {
            return None;
        }
        Some(score.clamp(0.0, 100.0))
    }

    /// 리스크 점수 = (변동성 점수 + 근접도 점수) / 2.
    ///
    /// - 변동성 점수: 100 - ATR% × 감점 계수
    /// - 근접도 점수: 예측 방향의 반대 레벨(상승 시 저항, 하락 시 지지)까지 거리를
    ///   ATR 단위로 재어 `proximity_atr_units`에서 만점. 레벨이 없으면 100.
    pub fn risk_score(&self, atr: f64, current: f64, structure: &StructureLevels, long_bias: bool) -> AdvisorResult<f64> {
        let atr_pct = atr / current * 100.0;
        let volatility = (100.0 - atr_pct * self.config.atr_pct_penalty).clamp(0.0, 100.0);

        let current_dec = to_price(current)?;
        let level = if long_bias {
            structure.nearest_resistance(current_dec)
        } else {
            structure.nearest_support(current_dec)
        };
        let proximity = match level {
            Some(level) => {
                let distance = (level.price.as_f64() - current).abs() / atr;
                (distance / self.config.proximity_atr_units * 100.0).clamp(0.0, 100.0)
            }
            None => 100.0,
        };

        Ok((volatility + proximity) / 2.0)
    }

    /// 구성 요소 점수 표준편차로 신뢰도를 정합니다. 구성 요소가 2개 미만이면 Low.
    pub fn confidence(&self, scores: &[f64]) -> ConfidenceLevel {
        if scores.len() < 2 {
            return ConfidenceLevel::Low;
        }
        let dispersion = stats::population_std(scores);
        if dispersion < self.config.high_confidence_std {
            ConfidenceLevel::High
        } else if dispersion < self.config.medium_confidence_std {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    /// 추천을 계산합니다.
    pub fn score(&self, input: &ScoringInput<'_>) -> AdvisorResult<Recommendation> {
        input.external.validate()?;
        if input.current_price <= Decimal::ZERO {
            return Err(AdvisorError::InvalidParameter(format!(
                "현재가는 0보다 커야 합니다: {}",
                input.current_price
            )));
        }

        let cfg = &self.config;
        let current = input.current_price.as_f64();
        let long_bias = input.projection.bias() >= 0;

        // ATR이 없거나 하한보다 작으면 하한 사용
        let atr_floor = current * cfg.min_atr_pct;
        let measured_atr = input.indicators.value(IndicatorName::Atr14).map(|a| a.as_f64());
        let atr = measured_atr.map_or(atr_floor, |a| a.max(atr_floor));

        let mut component_scores = BTreeMap::new();
        if let Some(technical) = self.technical_score(input.indicators, input.structure) {
            component_scores.insert(Component::Technical, technical);
        }
        for component in [Component::Ml, Component::Momentum, Component::Volume] {
            if let Some(score) = input.external.get(component) {
                component_scores.insert(component, score);
            }
        }
        if measured_atr.is_some() {
            let risk = self.risk_score(atr, current, input.structure, long_bias)?;
            component_scores.insert(Component::Risk, risk);
        }

        let present: Vec<Component> = component_scores.keys().copied().collect();
        if present.is_empty() {
            return Err(AdvisorError::insufficient("recommendation", 1, 0));
        }
        let excluded: Vec<Component> = Component::ALL
            .iter()
            .copied()
            .filter(|c| !component_scores.contains_key(c))
            .collect();

        let weights = cfg.weights.renormalized(&present).ok_or_else(|| {
            AdvisorError::Config("사용 가능한 구성 요소의 가중치 합이 0입니다".to_string())
        })?;
        let overall = present
            .iter()
            .map(|c| weights[c] * component_scores[c])
            .sum::<f64>()
            .clamp(0.0, 100.0);

        let label = Decision::from_score(overall, cfg.buy_threshold, cfg.sell_threshold);
        let scores: Vec<f64> = component_scores.values().copied().collect();
        let confidence = self.confidence(&scores);

        let long = match label {
            Decision::Buy => true,
            Decision::Sell => false,
            Decision::Hold => long_bias,
        };

        let target = self.target_price(input, current, long, confidence)?;
        let stop = self.stop_loss(input, current, atr, long)?;

        let reward = (target - input.current_price).abs();
        let risk = (input.current_price - stop).abs();
        let risk_reward_ratio = reward
            .checked_div(risk)
            .map(|r| r.as_f64())
            .unwrap_or(0.0);
        let expected_return_pct = (target.as_f64() / current - 1.0) * 100.0;

        let rationale = rationale::build(&component_scores, &excluded, input.indicators, input.structure);

        debug!(
            score = overall,
            label = %label,
            confidence = ?confidence,
            target = %target,
            stop = %stop,
            rr = risk_reward_ratio,
            excluded = excluded.len(),
            "추천 계산 완료"
        );

        Ok(Recommendation {
            label,
            confidence,
            overall_score: overall,
            component_scores,
            excluded_components: excluded,
            weights_used: weights,
            current_price: input.current_price,
            target_price: target,
            stop_loss: stop,
            risk_reward_ratio,
            expected_return_pct,
            horizon_days: input.projection.horizon.days(),
            rationale,
        })
    }

    /// 앙상블 예측가를 신뢰도 비율만큼 유리한 방향의 가장 가까운 레벨 쪽으로 당깁니다.
    ///
    /// 목표가는 추천 방향 쪽에 놓입니다: 매수 측은 현재가 이상, 매도 측은 현재가 이하.
    fn target_price(
        &self,
        input: &ScoringInput<'_>,
        current: f64,
        long: bool,
        confidence: ConfidenceLevel,
    ) -> AdvisorResult<Price> {
        let projected = input.projection.ensemble().projected_price;
        let level = if long {
            input.structure.nearest_resistance(input.current_price)
        } else {
            input.structure.nearest_support(input.current_price)
        };

        let target = match level {
            Some(level) => {
                let pull = self.config.target_pull(confidence);
                projected + pull * (level.price.as_f64() - projected)
            }
            None => projected,
        };
        let target = if long { target.max(current) } else { target.min(current) };
        to_price(target.max(current * STOP_FLOOR_RATIO))
    }

    /// ATR 배수 손절가. 더 가까운 반대 레벨이 있으면 그 레벨로 조정합니다.
    fn stop_loss(&self, input: &ScoringInput<'_>, current: f64, atr: f64, long: bool) -> AdvisorResult<Price> {
        let distance = self.config.stop_atr_multiple * atr;
        let stop = if long {
            let mut stop = current - distance;
            if let Some(support) = input.structure.nearest_support(input.current_price) {
                stop = stop.max(support.price.as_f64());
            }
            stop.max(current * STOP_FLOOR_RATIO)
        } else {
            let mut stop = current + distance;
            if let Some(resistance) = input.structure.nearest_resistance(input.current_price) {
                stop = stop.min(resistance.price.as_f64());
            }
            stop
        };

        let stop = to_price(stop)?;
        // 반올림으로 현재가와 같아지는 경우 한 틱 바깥으로
        if stop == input.current_price {
            let tick = Decimal::new(1, advisor_core::PRICE_SCALE);
            return Ok(if long { stop - tick } else { stop + tick });
        }
        Ok(stop)
    }
}

fn to_price(value: f64) -> AdvisorResult<Price> {
    price_from_f64(value)
        .ok_or_else(|| AdvisorError::Calculation(format!("가격으로 변환할 수 없는 값: {}", value)))
}
