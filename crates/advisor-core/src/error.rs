//! 분석 엔진의 에러 타입.
//!
//! 에러는 세 가지 부류로 나뉩니다:
//! - 데이터 부족: 구성 요소별로 생략 처리되며 호출 전체를 실패시키지 않습니다.
//! - 잘못된 파라미터 / 잘못된 시계열: 계산 전에 호출을 거부합니다.
//! - 수치 계산 오류: 유한하지 않은 값 등.

use thiserror::Error;

/// 핵심 분석 에러.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdvisorError {
    /// 잘못된 파라미터 (예: 범위를 벗어난 예측 기간)
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 잘못된 시계열 (날짜 순서, 0 이하 가격 등)
    #[error("잘못된 시계열: {0}")]
    MalformedSeries(String),

    /// 데이터 부족
    #[error("{component} 데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData {
        component: String,
        required: usize,
        provided: usize,
    },

    /// 계산 에러
    #[error("계산 에러: {0}")]
    Calculation(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 분석 작업을 위한 Result 타입.
pub type AdvisorResult<T> = Result<T, AdvisorError>;

impl AdvisorError {
    /// 데이터 부족 에러를 생성합니다.
    pub fn insufficient(component: impl Into<String>, required: usize, provided: usize) -> Self {
        AdvisorError::InsufficientData {
            component: component.into(),
            required,
            provided,
        }
    }

    /// 호출 전체를 거부해야 하는 에러인지 확인합니다.
    ///
    /// 데이터 부족은 구성 요소 단위로 복구되므로 거부 대상이 아닙니다.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AdvisorError::InvalidParameter(_)
                | AdvisorError::MalformedSeries(_)
                | AdvisorError::Config(_)
        )
    }

    /// 데이터 부족 에러인지 확인합니다.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, AdvisorError::InsufficientData { .. })
    }
}

impl From<config::ConfigError> for AdvisorError {
    fn from(err: config::ConfigError) -> Self {
        AdvisorError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AdvisorError {
    fn from(err: serde_json::Error) -> Self {
        AdvisorError::Calculation(err.to_string())
    }
}
