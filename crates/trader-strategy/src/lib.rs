//! 백테스트 전략 및 파라미터 파싱.
//!
//! 이 크레이트가 제공하는 기능:
//! - 일별 스텝 계약을 정의하는 `Strategy` trait
//! - 자유 형식 파라미터 맵을 타입이 있는 `StrategyParams`로 변환하는 파싱 단계
//! - 내장 전략 (월말 로테이션, 매수 후 보유)
//! - 지원 전략 카탈로그 (`StrategyRegistry`)
//!
//! # 예제
//!
//! ```rust,ignore
//! use trader_strategy::{StrategyConfig, StrategyRegistry};
//!
//! let config = StrategyConfig::new("monthly_rotation")
//!     .with_param("buy_days_before_month_end", 2);
//! let params = config.parse()?;
//! let strategy = StrategyRegistry::create(&params);
//! ```

pub mod config;
pub mod registry;
pub mod strategies;
pub mod traits;

pub use config::{
    BuyAndHoldParams, MonthlyRotationParams, RebalanceFrequency, StrategyConfig, StrategyParams,
    BUY_AND_HOLD, MONTHLY_ROTATION,
};
pub use registry::{ParameterDefault, ParameterKind, ParameterSpec, StrategyMeta, StrategyRegistry};
pub use strategies::{BuyAndHoldStrategy, MonthlyRotationStrategy};
pub use traits::Strategy;
