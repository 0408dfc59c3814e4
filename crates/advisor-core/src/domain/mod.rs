//! 분석 엔진의 도메인 모델.

mod indicator_set;
mod market_data;
mod projection;
mod recommendation;
mod report;
mod structure;

pub use indicator_set::*;
pub use market_data::*;
pub use projection::*;
pub use recommendation::*;
pub use report::*;
pub use structure::*;
