//! 백테스트 서비스.
//!
//! 가격 데이터 조회, 엔진 실행, 결과 저장을 하나로 묶는 파사드입니다.
//!
//! # CPU-intensive 작업 처리
//!
//! `parallel_strategies`가 켜져 있으면 다중 전략 비교의 전략별 실행을
//! `tokio::task::spawn_blocking`으로 blocking thread pool에 분산합니다.
//! 결과는 항상 요청 순서대로 정렬되며 순차 실행과 같습니다.

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use trader_core::{BacktestSettings, PriceSeries, TraderError, TraderResult};
use trader_data::{PriceSeriesProvider, ResultStore};
use trader_strategy::{StrategyMeta, StrategyRegistry};

use crate::backtest::{
    BacktestConfig, BacktestEngine, BacktestRequest, BacktestResult, MultiStrategyBacktestRequest,
    MultiStrategyBacktestResult, MultiStrategyRunner,
};

/// 백테스트 실행 및 결과 조회 서비스.
pub struct BacktestService {
    provider: Arc<dyn PriceSeriesProvider>,
    runner: Arc<MultiStrategyRunner>,
    parallel: bool,
    results: ResultStore<BacktestResult>,
    multi_results: ResultStore<MultiStrategyBacktestResult>,
}

impl BacktestService {
    /// 설정으로 서비스를 생성합니다. 결과 저장소는 비어 있는 상태로 시작합니다.
    pub fn new(provider: Arc<dyn PriceSeriesProvider>, settings: &BacktestSettings) -> Self {
        let engine = BacktestEngine::new(BacktestConfig::from(settings));
        let runner = MultiStrategyRunner::new(engine).with_max_strategies(settings.max_strategies);
        Self {
            provider,
            runner: Arc::new(runner),
            parallel: settings.parallel_strategies,
            results: ResultStore::new(),
            multi_results: ResultStore::new(),
        }
    }

    /// 가격 데이터 Provider 이름.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// 단일 전략 백테스트를 실행하고 결과를 저장합니다.
    pub async fn run_backtest(&self, request: BacktestRequest) -> TraderResult<Arc<BacktestResult>> {
        request.validate()?;
        info!(
            asset = %request.asset_id,
            strategy = %request.strategy.strategy_type,
            "Backtest requested"
        );

        let series = self
            .provider
            .fetch_daily_bars(&request.asset_id, request.start_date, request.end_date)
            .await?;
        let result = self.runner.engine().run(&request, &series)?;

        let id = result.id.clone();
        Ok(self.results.insert(id, result))
    }

    /// 다중 전략 백테스트를 실행하고 결과를 저장합니다.
    ///
    /// 검증은 데이터 조회와 시뮬레이션보다 먼저 수행됩니다.
    pub async fn run_multi_strategy_backtest(
        &self,
        request: MultiStrategyBacktestRequest,
    ) -> TraderResult<Arc<MultiStrategyBacktestResult>> {
        let started = Instant::now();
        request.validate(self.runner.max_strategies())?;
        info!(
            asset = %request.asset_id,
            strategies = request.strategies.len(),
            parallel = self.parallel,
            "Multi-strategy backtest requested"
        );

        let series = self
            .provider
            .fetch_daily_bars(&request.asset_id, request.start_date, request.end_date)
            .await?;

        let request = Arc::new(request);
        let series = Arc::new(series);
        let results = if self.parallel {
            self.run_parallel(&request, &series).await?
        } else {
            self.runner.run_strategies(&request, &series)?
        };

        let benchmark_result = match request.benchmark_asset() {
            Some(asset) => match self
                .provider
                .fetch_daily_bars(asset, request.start_date, request.end_date)
                .await
            {
                Ok(bench_series) => self.runner.run_benchmark(&request, &bench_series),
                Err(e) => {
                    warn!(benchmark = asset, error = %e, "Benchmark data unavailable, omitting");
                    None
                }
            },
            None => None,
        };

        let result = self
            .runner
            .assemble(&request, results, benchmark_result, started)?;
        let id = result.id.clone();
        Ok(self.multi_results.insert(id, result))
    }

    /// 전략별 실행을 blocking thread pool에 분산합니다.
    async fn run_parallel(
        &self,
        request: &Arc<MultiStrategyBacktestRequest>,
        series: &Arc<PriceSeries>,
    ) -> TraderResult<Vec<BacktestResult>> {
        let handles = (0..request.strategies.len()).map(|index| {
            let runner = Arc::clone(&self.runner);
            let request = Arc::clone(request);
            let series = Arc::clone(series);
            tokio::task::spawn_blocking(move || runner.run_one(&request, index, &series))
        });

        let outcomes = futures::future::try_join_all(handles)
            .await
            .map_err(|e| TraderError::Computation(format!("백테스트 태스크 실행 실패: {}", e)))?;

        // 요청 순서상 첫 번째 실패를 보고
        outcomes.into_iter().collect()
    }

    /// 저장된 단일 백테스트 결과.
    pub fn get_result(&self, id: &str) -> Option<Arc<BacktestResult>> {
        self.results.get(id)
    }

    /// 저장된 다중 전략 결과.
    pub fn get_multi_result(&self, id: &str) -> Option<Arc<MultiStrategyBacktestResult>> {
        self.multi_results.get(id)
    }

    /// 저장된 단일 백테스트 결과 목록 (저장 순서).
    pub fn list_results(&self) -> Vec<Arc<BacktestResult>> {
        self.results.list()
    }

    /// 저장된 다중 전략 결과 목록 (저장 순서).
    pub fn list_multi_results(&self) -> Vec<Arc<MultiStrategyBacktestResult>> {
        self.multi_results.list()
    }

    /// 모든 저장 결과를 삭제하고 삭제된 수를 반환합니다.
    pub fn clear_cache(&self) -> usize {
        let removed = self.results.clear() + self.multi_results.clear();
        info!(removed, "Backtest result cache cleared");
        removed
    }

    /// 지원 전략 카탈로그.
    pub fn supported_strategies(&self) -> &'static [StrategyMeta] {
        StrategyRegistry::all()
    }
}
