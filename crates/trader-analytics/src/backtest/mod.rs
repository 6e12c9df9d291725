//! 백테스팅 모듈
//!
//! 과거 일봉으로 전략을 시뮬레이션하고 성과를 분석합니다.
//!
//! # 주요 구성요소
//!
//! - [`BacktestConfig`]: 백테스트 설정 (수수료, 무위험 이자율)
//! - [`BacktestEngine`]: 단일 전략 실행 엔진
//! - [`MultiStrategyRunner`]: 다중 전략 순차 실행 및 비교

pub mod engine;
pub mod multi;

pub use engine::{BacktestConfig, BacktestEngine, BacktestRequest, BacktestResult, Simulation};
pub use multi::{
    MultiStrategyBacktestRequest, MultiStrategyBacktestResult, MultiStrategyRunner,
    DEFAULT_MAX_STRATEGIES,
};
