//! 다중 전략 비교 명령어.
//!
//! 비교 요청 파일(TOML 또는 JSON)을 읽어 여러 전략을 같은 조건으로 실행하고 비교합니다.
//!
//! # 요청 파일 예시 (`strategies.toml`)
//!
//! ```toml
//! asset_id = "csi300"
//! start_date = "2023-01-01"
//! end_date = "2023-12-31"
//! initial_cash = "100000"
//! benchmark = "sse50"
//!
//! [comparison_options]
//! metrics = ["total_return", "sharpe_ratio", "max_drawdown"]
//! include_benchmark = true
//!
//! [[strategies]]
//! type = "monthly_rotation"
//! parameters = { buy_days_before_month_end = 2 }
//!
//! [[strategies]]
//! type = "buy_and_hold"
//! ```

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use trader_analytics::{BacktestService, MultiStrategyBacktestRequest, MultiStrategyBacktestResult};

/// 비교 요청 파일 로드.
pub fn load_request(path: &Path) -> Result<MultiStrategyBacktestRequest> {
    if !path.exists() {
        return Err(anyhow!("Comparison file not found: {}", path.display()));
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => parse_toml(&content),
        Some("json") => Ok(serde_json::from_str(&content)?),
        _ => Err(anyhow!(
            "Unsupported comparison file format. Use .toml or .json: {}",
            path.display()
        )),
    }
}

/// TOML 형식 비교 요청 파싱.
pub fn parse_toml(content: &str) -> Result<MultiStrategyBacktestRequest> {
    Ok(toml::from_str(content)?)
}

/// 다중 전략 비교 실행.
pub async fn run_compare(
    service: &BacktestService,
    request: MultiStrategyBacktestRequest,
) -> Result<Arc<MultiStrategyBacktestResult>> {
    info!(
        asset = %request.asset_id,
        strategies = request.strategies.len(),
        provider = service.provider_name(),
        "Running strategy comparison"
    );

    Ok(service.run_multi_strategy_backtest(request).await?)
}

/// 비교 결과를 사람이 읽는 형식으로 출력합니다.
pub fn print_comparison(result: &MultiStrategyBacktestResult) {
    let comparison = &result.comparison;

    println!("{}", comparison.summary);

    for (label, strategy) in comparison.labels.iter().zip(&result.results) {
        println!("\n[{}] {}", label, strategy.performance_metrics.summary());
    }
    if let Some(benchmark) = &result.benchmark_result {
        println!(
            "\n[벤치마크 {}] {}",
            benchmark.request.asset_id,
            benchmark.performance_metrics.summary()
        );
    }

    let width = comparison.labels.iter().map(String::len).max().unwrap_or(0).max(8);

    println!("\n지표별 순위");
    print!("{:<20}", "");
    for label in &comparison.labels {
        print!(" {:>width$}", label, width = width);
    }
    println!();
    for metric in &comparison.metrics {
        print!("{:<20}", metric.metric.as_str());
        for (value, rank) in metric.values.iter().zip(&metric.ranks) {
            let cell = format!("{:.4} (#{})", value, rank);
            print!(" {:>width$}", cell, width = width);
        }
        println!();
    }

    print!("{:<20}", "score");
    for score in &comparison.scores {
        print!(" {:>width$.4}", score, width = width);
    }
    println!();

    println!("\n수익률 상관계수");
    let corr = &comparison.correlation_matrix;
    print!("{:<20}", "");
    for label in &corr.labels {
        print!(" {:>width$}", label, width = width);
    }
    println!();
    for (label, row) in corr.labels.iter().zip(&corr.matrix) {
        print!("{:<20}", label);
        for value in row {
            print!(" {:>width$.3}", value, width = width);
        }
        println!();
    }

    println!("\n실행 시간: {}ms", result.duration_ms);
}
