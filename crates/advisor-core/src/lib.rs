//! # Advisor Core
//!
//! 기술적 분석 추천 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! - 일봉 시계열과 검증 (`PriceSeries`)
//! - 지표, 차트 구조, 가격 예측, 추천 결과 타입
//! - 에러 분류
//! - 설정 관리
//! - 로깅 인프라
//! - 표시/내보내기용 평면 레코드

pub mod config;
pub mod domain;
pub mod error;
pub mod flat;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use flat::*;
pub use logging::*;
pub use types::*;
