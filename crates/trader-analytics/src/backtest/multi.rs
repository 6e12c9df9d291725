//! 다중 전략 백테스트.
//!
//! 같은 자산·구간·초기 자본에 대해 여러 전략을 순서대로 실행하고 비교합니다.
//! 하나라도 실패하면 전체가 실패하며, 실패한 전략의 위치와 타입을 보고합니다.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};
use trader_core::{Amount, PriceSeries, TraderError, TraderResult};
use trader_strategy::{StrategyConfig, StrategyRegistry};
use uuid::Uuid;

use super::engine::{validate_common, BacktestEngine, BacktestRequest, BacktestResult};
use crate::comparison::{ComparisonEngine, ComparisonOptions, StrategyComparison};

/// 비교 요청당 기본 최대 전략 수.
pub const DEFAULT_MAX_STRATEGIES: usize = 10;

/// 다중 전략 백테스트 요청.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiStrategyBacktestRequest {
    pub asset_id: String,
    /// 비교할 전략 설정 (1 ~ 최대 전략 수)
    pub strategies: Vec<StrategyConfig>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_cash: Amount,
    /// 벤치마크 자산 ID (자산과 다를 때만 실행)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_options: Option<ComparisonOptions>,
}

impl MultiStrategyBacktestRequest {
    pub fn new(
        asset_id: impl Into<String>,
        strategies: Vec<StrategyConfig>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        initial_cash: Amount,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            strategies,
            start_date,
            end_date,
            initial_cash,
            benchmark: None,
            comparison_options: None,
        }
    }

    pub fn with_benchmark(mut self, benchmark: impl Into<String>) -> Self {
        self.benchmark = Some(benchmark.into());
        self
    }

    pub fn with_comparison_options(mut self, options: ComparisonOptions) -> Self {
        self.comparison_options = Some(options);
        self
    }

    /// 비교 옵션 (미지정 시 기본값).
    pub fn options(&self) -> ComparisonOptions {
        self.comparison_options.clone().unwrap_or_default()
    }

    /// 실행할 벤치마크 자산. 비어 있거나 대상 자산과 같으면 `None`.
    pub fn benchmark_asset(&self) -> Option<&str> {
        self.benchmark
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty() && *b != self.asset_id)
    }

    /// 요청을 검사합니다. 데이터 조회나 시뮬레이션 전에 호출해야 합니다.
    pub fn validate(&self, max_strategies: usize) -> TraderResult<()> {
        if self.strategies.is_empty() {
            return Err(TraderError::validation("전략이 최소 1개 필요합니다"));
        }
        if self.strategies.len() > max_strategies {
            return Err(TraderError::validation(format!(
                "비교 가능한 전략 수는 최대 {}개입니다: {}개 요청",
                max_strategies,
                self.strategies.len()
            )));
        }
        validate_common(
            &self.asset_id,
            self.start_date,
            self.end_date,
            self.initial_cash,
        )?;
        if let Some(index) = self
            .strategies
            .iter()
            .position(|s| s.strategy_type.trim().is_empty())
        {
            return Err(TraderError::validation(format!(
                "{}번째 전략의 타입이 비어 있습니다",
                index + 1
            )));
        }
        if let Some(options) = &self.comparison_options {
            options.validate()?;
        }
        Ok(())
    }

    /// `index`번째 전략의 단일 백테스트 요청.
    pub fn strategy_request(&self, index: usize) -> Option<BacktestRequest> {
        self.strategies.get(index).map(|strategy| BacktestRequest {
            asset_id: self.asset_id.clone(),
            strategy: strategy.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            initial_cash: self.initial_cash,
            benchmark: self.benchmark.clone(),
        })
    }

    /// 벤치마크 자산의 Buy-and-Hold 요청.
    pub fn benchmark_request(&self) -> Option<BacktestRequest> {
        let asset = self.benchmark_asset()?;
        let params = StrategyRegistry::benchmark_params();
        let strategy = StrategyConfig::from_params(&params)
            .with_description(format!("Benchmark: {}", asset));
        Some(BacktestRequest::new(
            asset,
            strategy,
            self.start_date,
            self.end_date,
            self.initial_cash,
        ))
    }
}

/// 다중 전략 백테스트 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiStrategyBacktestResult {
    pub id: String,
    pub request: MultiStrategyBacktestRequest,
    /// 요청 순서대로 정렬된 전략별 결과
    pub results: Vec<BacktestResult>,
    pub comparison: StrategyComparison,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_result: Option<BacktestResult>,
    pub created_at: DateTime<Utc>,
    /// 실행 시간 (밀리초)
    pub duration_ms: u64,
}

/// 다중 전략 순차 실행기.
#[derive(Debug, Clone)]
pub struct MultiStrategyRunner {
    engine: BacktestEngine,
    comparison: ComparisonEngine,
    max_strategies: usize,
}

impl MultiStrategyRunner {
    pub fn new(engine: BacktestEngine) -> Self {
        Self {
            engine,
            comparison: ComparisonEngine::new(),
            max_strategies: DEFAULT_MAX_STRATEGIES,
        }
    }

    pub fn with_max_strategies(mut self, max: usize) -> Self {
        self.max_strategies = max;
        self
    }

    pub fn engine(&self) -> &BacktestEngine {
        &self.engine
    }

    pub fn max_strategies(&self) -> usize {
        self.max_strategies
    }

    /// 단일 전략 실행. 실패는 위치와 타입으로 감쌉니다.
    pub fn run_one(
        &self,
        request: &MultiStrategyBacktestRequest,
        index: usize,
        series: &PriceSeries,
    ) -> TraderResult<BacktestResult> {
        let single = request.strategy_request(index).ok_or_else(|| {
            TraderError::Computation(format!("전략 인덱스 범위 초과: {}", index))
        })?;
        self.engine
            .run(&single, series)
            .map_err(|e| TraderError::strategy_failed(index, single.strategy.strategy_type, e))
    }

    /// 모든 전략을 요청 순서대로 실행합니다. 첫 실패에서 중단합니다.
    pub fn run_strategies(
        &self,
        request: &MultiStrategyBacktestRequest,
        series: &PriceSeries,
    ) -> TraderResult<Vec<BacktestResult>> {
        (0..request.strategies.len())
            .map(|index| self.run_one(request, index, series))
            .collect()
    }

    /// 벤치마크를 실행합니다. 실패하면 경고를 남기고 `None`.
    pub fn run_benchmark(
        &self,
        request: &MultiStrategyBacktestRequest,
        series: &PriceSeries,
    ) -> Option<BacktestResult> {
        let benchmark = request.benchmark_request()?;
        match self.engine.run(&benchmark, series) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(benchmark = %benchmark.asset_id, error = %e, "Benchmark run failed, omitting");
                None
            }
        }
    }

    /// 실행 결과를 비교하고 최종 결과를 조립합니다.
    pub fn assemble(
        &self,
        request: &MultiStrategyBacktestRequest,
        results: Vec<BacktestResult>,
        benchmark_result: Option<BacktestResult>,
        started: Instant,
    ) -> TraderResult<MultiStrategyBacktestResult> {
        let comparison =
            self.comparison
                .compare(&results, benchmark_result.as_ref(), &request.options())?;

        info!(
            asset = %request.asset_id,
            strategies = results.len(),
            benchmark = benchmark_result.is_some(),
            best = %comparison.best_strategy,
            "Multi-strategy backtest completed"
        );

        Ok(MultiStrategyBacktestResult {
            id: Uuid::new_v4().to_string(),
            request: request.clone(),
            results,
            comparison,
            benchmark_result,
            created_at: Utc::now(),
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// 검증 → 전략별 실행 → (벤치마크) → 비교.
    ///
    /// `benchmark_series`는 벤치마크 자산의 시계열이며, 없으면 벤치마크를 건너뜁니다.
    pub fn run(
        &self,
        request: &MultiStrategyBacktestRequest,
        series: &PriceSeries,
        benchmark_series: Option<&PriceSeries>,
    ) -> TraderResult<MultiStrategyBacktestResult> {
        let started = Instant::now();
        request.validate(self.max_strategies)?;

        let results = self.run_strategies(request, series)?;
        let benchmark_result = benchmark_series.and_then(|s| self.run_benchmark(request, s));

        self.assemble(request, results, benchmark_result, started)
    }
}
