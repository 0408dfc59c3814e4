//! 표시/내보내기를 위한 평면 레코드 변환.
//!
//! 각 결과 타입은 `FlatRecord`를 구현하여 점(`.`)으로 구분된 키와
//! 스칼라 JSON 값의 매핑을 제공합니다. 표 형식 출력이나 CSV 내보내기는
//! 이 매핑 위에서 호출자가 구성합니다.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::{
    AnalysisReport, IndicatorReading, IndicatorSet, ProjectionResult, Recommendation,
    StructureLevels,
};

/// 평면 레코드.
pub type Record = BTreeMap<String, Value>;

/// 평면 레코드로 변환 가능한 타입.
pub trait FlatRecord {
    /// 키 → 스칼라 값 매핑을 반환합니다.
    fn flat_record(&self) -> Record;

    /// 모든 키 앞에 `prefix.`를 붙인 레코드.
    fn flat_record_with_prefix(&self, prefix: &str) -> Record {
        self.flat_record()
            .into_iter()
            .map(|(k, v)| (format!("{}.{}", prefix, k), v))
            .collect()
    }
}

fn decimal(value: Decimal) -> Value {
    Value::String(value.to_string())
}

/// 유한하지 않은 값은 null로 기록합니다.
fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

impl FlatRecord for IndicatorSet {
    fn flat_record(&self) -> Record {
        let mut record = Record::new();
        for (name, reading) in self.iter() {
            let key = name.label();
            match reading {
                IndicatorReading::Available { value, state } => {
                    record.insert(key.to_string(), decimal(*value));
                    if let Some(state) = state {
                        record.insert(format!("{}.state", key), Value::String(state.to_string()));
                    }
                }
                IndicatorReading::Unavailable { required, provided } => {
                    record.insert(key.to_string(), Value::String("unavailable".to_string()));
                    record.insert(
                        format!("{}.required", key),
                        Value::from(*required as u64),
                    );
                    record.insert(
                        format!("{}.provided", key),
                        Value::from(*provided as u64),
                    );
                }
            }
        }
        record
    }
}

impl FlatRecord for StructureLevels {
    fn flat_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("levels".to_string(), Value::from(self.levels.len() as u64));
        record.insert("patterns".to_string(), Value::from(self.patterns.len() as u64));

        for (i, level) in self.levels.iter().enumerate() {
            let kind = match level.kind {
                crate::domain::LevelKind::Support => "support",
                crate::domain::LevelKind::Resistance => "resistance",
            };
            record.insert(format!("level.{}.price", i), decimal(level.price));
            record.insert(format!("level.{}.kind", i), Value::String(kind.to_string()));
            record.insert(
                format!("level.{}.strength", i),
                Value::from(level.strength as u64),
            );
        }

        for (i, pattern) in self.patterns.iter().enumerate() {
            record.insert(
                format!("pattern.{}.kind", i),
                Value::String(pattern.kind.label().to_string()),
            );
            record.insert(format!("pattern.{}.confidence", i), number(pattern.confidence));
        }
        record
    }
}

impl FlatRecord for ProjectionResult {
    fn flat_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("horizon_days".to_string(), Value::from(self.horizon.days()));
        record.insert("current_price".to_string(), number(self.current_price));

        for (method, projection) in self.all() {
            let key = method.label();
            record.insert(
                format!("{}.projected_price", key),
                number(projection.projected_price),
            );
            record.insert(
                format!("{}.percent_change", key),
                number(projection.percent_change),
            );
            record.insert(format!("{}.band_low", key), number(projection.band.low));
            record.insert(format!("{}.band_high", key), number(projection.band.high));
        }

        for omitted in &self.omitted {
            record.insert(
                format!("{}.omitted", omitted.method.label()),
                Value::String(omitted.reason.clone()),
            );
        }
        record
    }
}

impl FlatRecord for Recommendation {
    fn flat_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("label".to_string(), Value::String(self.label.to_string()));
        record.insert(
            "confidence".to_string(),
            Value::String(self.confidence.to_string()),
        );
        record.insert("overall_score".to_string(), number(self.overall_score));
        record.insert("current_price".to_string(), decimal(self.current_price));
        record.insert("target_price".to_string(), decimal(self.target_price));
        record.insert("stop_loss".to_string(), decimal(self.stop_loss));
        record.insert(
            "risk_reward_ratio".to_string(),
            number(self.risk_reward_ratio),
        );
        record.insert(
            "expected_return_pct".to_string(),
            number(self.expected_return_pct),
        );
        record.insert("horizon_days".to_string(), Value::from(self.horizon_days));

        for (component, score) in &self.component_scores {
            record.insert(format!("score.{}", component.label()), number(*score));
        }
        for component in &self.excluded_components {
            record.insert(format!("score.{}", component.label()), Value::Null);
        }
        for (component, weight) in &self.weights_used {
            record.insert(format!("weight.{}", component.label()), number(*weight));
        }
        record.insert(
            "rationale".to_string(),
            Value::String(self.rationale.join("; ")),
        );
        record
    }
}

impl FlatRecord for AnalysisReport {
    fn flat_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("symbol".to_string(), Value::String(self.symbol.clone()));
        record.insert("as_of".to_string(), Value::String(self.as_of.to_string()));
        record.extend(self.indicators.flat_record_with_prefix("indicator"));
        record.extend(self.structure.flat_record_with_prefix("structure"));
        record.extend(self.projection.flat_record_with_prefix("projection"));
        record.extend(self.recommendation.flat_record_with_prefix("recommendation"));
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IndicatorName, SignalState};
    use rust_decimal_macros::dec;

    #[test]
    fn test_indicator_record() {
        let mut set = IndicatorSet::new();
        set.insert(
            IndicatorName::Rsi14,
            IndicatorReading::with_state(dec!(25.5), SignalState::Oversold),
        );
        set.insert(IndicatorName::Macd, IndicatorReading::unavailable(34, 33));

        let record = set.flat_record();
        assert_eq!(record["RSI-14"], Value::String("25.5".to_string()));
        assert_eq!(record["RSI-14.state"], Value::String("oversold".to_string()));
        assert_eq!(record["MACD"], Value::String("unavailable".to_string()));
        assert_eq!(record["MACD.required"], Value::from(34u64));
    }

    #[test]
    fn test_prefix_and_non_finite() {
        assert_eq!(number(f64::NAN), Value::Null);

        let mut set = IndicatorSet::new();
        set.insert(IndicatorName::Atr14, IndicatorReading::value_only(dec!(2)));
        let record = set.flat_record_with_prefix("indicator");
        assert!(record.contains_key("indicator.ATR-14"));
    }
}
