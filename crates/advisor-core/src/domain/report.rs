//! 한 번의 분석 호출 결과 묶음.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{IndicatorSet, ProjectionResult, Recommendation, StructureLevels};

/// 지표, 구조, 예측, 추천을 묶은 분석 보고서.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    /// 마지막 일봉 날짜
    pub as_of: NaiveDate,
    pub indicators: IndicatorSet,
    pub structure: StructureLevels,
    pub projection: ProjectionResult,
    pub recommendation: Recommendation,
}
