//! 백테스트 시뮬레이션을 위한 도메인 모델.

mod daily;
mod market_data;
mod portfolio;
mod position;
mod trade;

pub use daily::*;
pub use market_data::*;
pub use portfolio::*;
pub use position::*;
pub use trade::*;
