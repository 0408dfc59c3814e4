//! 가격 예측 결과 타입.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Horizon;

/// 예측 방법.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMethod {
    /// 선형 추세 (최소제곱 회귀)
    Trend,
    /// 이동평균 수렴
    MovingAverage,
    /// 지지/저항 진동
    SupportResistance,
    /// 변동성 기반 몬테카를로
    MonteCarlo,
    /// 앙상블 (개별 방법의 산술 평균)
    Ensemble,
}

impl ProjectionMethod {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectionMethod::Trend => "trend",
            ProjectionMethod::MovingAverage => "moving_average",
            ProjectionMethod::SupportResistance => "support_resistance",
            ProjectionMethod::MonteCarlo => "monte_carlo",
            ProjectionMethod::Ensemble => "ensemble",
        }
    }
}

impl fmt::Display for ProjectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 신뢰 구간.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub low: f64,
    pub high: f64,
}

impl ConfidenceBand {
    /// 두 경계를 정렬하여 생성합니다.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// 중심에서 ±half_width.
    pub fn around(center: f64, half_width: f64) -> Self {
        Self::new(center - half_width.abs(), center + half_width.abs())
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// 단일 방법의 예측 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodProjection {
    /// H일 후 예측 가격
    pub projected_price: f64,
    /// 현재가 대비 변화율 (%)
    pub percent_change: f64,
    pub band: ConfidenceBand,
    /// 1일차부터 H일차까지의 예측 경로
    pub path: Vec<f64>,
}

impl MethodProjection {
    /// 변화율을 계산하여 생성합니다.
    pub fn new(current_price: f64, projected_price: f64, band: ConfidenceBand, path: Vec<f64>) -> Self {
        let percent_change = if current_price > 0.0 {
            (projected_price / current_price - 1.0) * 100.0
        } else {
            0.0
        };
        Self {
            projected_price,
            percent_change,
            band,
            path,
        }
    }
}

/// 데이터 부족으로 생략된 예측 방법.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OmittedMethod {
    pub method: ProjectionMethod,
    pub reason: String,
}

/// 예측 기간 H에 대한 전체 예측 결과.
///
/// 앙상블 항목은 항상 존재합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub horizon: Horizon,
    pub current_price: f64,
    /// 개별 방법의 예측 (앙상블 제외)
    pub methods: BTreeMap<ProjectionMethod, MethodProjection>,
    pub ensemble: MethodProjection,
    pub omitted: Vec<OmittedMethod>,
}

impl ProjectionResult {
    /// 방법별 예측을 조회합니다. `Ensemble`은 항상 `Some`입니다.
    pub fn get(&self, method: ProjectionMethod) -> Option<&MethodProjection> {
        match method {
            ProjectionMethod::Ensemble => Some(&self.ensemble),
            other => self.methods.get(&other),
        }
    }

    pub fn ensemble(&self) -> &MethodProjection {
        &self.ensemble
    }

    /// 앙상블을 포함한 전체 예측.
    pub fn all(&self) -> impl Iterator<Item = (ProjectionMethod, &MethodProjection)> {
        self.methods
            .iter()
            .map(|(m, p)| (*m, p))
            .chain(std::iter::once((ProjectionMethod::Ensemble, &self.ensemble)))
    }

    pub fn is_omitted(&self, method: ProjectionMethod) -> bool {
        self.omitted.iter().any(|o| o.method == method)
    }

    /// 앙상블 기준 방향: 상승 +1, 하락 -1, 보합 0.
    pub fn bias(&self) -> i32 {
        if self.ensemble.projected_price > self.current_price {
            1
        } else if self.ensemble.projected_price < self.current_price {
            -1
        } else {
            0
        }
    }
}
