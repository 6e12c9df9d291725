//! 내장 전략.
//!
//! - `monthly_rotation`: 월말 매수, 월초 매도
//! - `buy_and_hold`: 최초 매수 후 보유, 선택적 리밸런싱

pub mod buy_and_hold;
pub mod monthly_rotation;

pub use buy_and_hold::BuyAndHoldStrategy;
pub use monthly_rotation::MonthlyRotationStrategy;
