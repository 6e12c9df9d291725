//! 백테스트 실행, 성과 분석, 다중 전략 비교.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 백테스팅 엔진 (일봉 단위 전략 실행, 일별 자산 곡선)
//! - 성과 지표 계산
//! - 전략 간 수익률 상관관계
//! - 다중 전략 비교 (지표별 순위, 종합 점수, 요약)
//! - 데이터 조회와 결과 저장을 묶은 백테스트 서비스
//!
//! # Re-exports
//!
//! - [`backtest`]: 엔진과 요청/결과 타입
//! - [`performance`]: 성과 지표 (PerformanceMetrics, MetricsCalculator 등)
//! - [`comparison`]: 다중 전략 비교 (ComparisonEngine, StrategyComparison 등)

pub mod backtest;
pub mod comparison;
pub mod correlation;
pub mod performance;
pub mod service;

// Backtest 모듈 re-exports
pub use backtest::{
    BacktestConfig, BacktestEngine, BacktestRequest, BacktestResult, MultiStrategyBacktestRequest,
    MultiStrategyBacktestResult, MultiStrategyRunner,
};

// Performance 모듈 re-exports
pub use performance::metrics::{
    pair_round_trips, MetricsCalculator, PerformanceMetrics, RoundTrip, DEFAULT_RISK_FREE_RATE,
    TRADING_DAYS_PER_YEAR,
};

// Comparison re-export
pub use comparison::{
    ComparisonEngine, ComparisonMetric, ComparisonOptions, MetricComparison, StrategyComparison,
};

// Correlation re-export
pub use correlation::{calculate_correlation, correlation_matrix, CorrelationMatrix};

// Service re-export
pub use service::BacktestService;
