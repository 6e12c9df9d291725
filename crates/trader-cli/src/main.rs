//! 전략 백테스트 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 단일 전략 백테스트
//! trader backtest -a csi300 -s monthly_rotation -f 2023-01-01 -t 2023-12-31
//!
//! # 비교 요청 파일로 다중 전략 비교 (JSON 출력)
//! trader --json compare --file strategies.toml
//!
//! # 지원 전략 목록
//! trader strategies
//! ```
//!
//! 설정은 `--config` 파일과 `BACKTEST__` 접두사 환경 변수에서 읽습니다.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use trader_analytics::BacktestService;
use trader_cli::commands::backtest::{print_result, run_backtest, BacktestCliConfig};
use trader_cli::commands::compare::{load_request, print_comparison, run_compare};
use trader_cli::commands::strategies::print_strategies;
use trader_cli::commands::{parse_date, print_json};
use trader_core::{init_logging, AppConfig};
use trader_data::SyntheticPriceProvider;

#[derive(Parser)]
#[command(name = "trader")]
#[command(about = "Strategy backtest CLI - 전략 백테스트 및 다중 전략 비교", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 결과를 JSON으로 출력
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 단일 전략 백테스트 실행
    Backtest {
        /// 자산 ID (예: csi300, sse50)
        #[arg(short, long)]
        asset: String,

        /// 전략 타입 (monthly_rotation, buy_and_hold)
        #[arg(short, long)]
        strategy: String,

        /// 전략 파라미터 (key=value, 반복 가능)
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(short = 'f', long)]
        from: String,

        /// 종료 날짜 (YYYY-MM-DD)
        #[arg(short, long)]
        to: String,

        /// 초기 자본
        #[arg(long, default_value = "100000")]
        cash: Decimal,
    },

    /// 비교 요청 파일로 다중 전략 비교
    Compare {
        /// 비교 요청 파일 (TOML 또는 JSON)
        #[arg(long)]
        file: PathBuf,

        /// 전략별 병렬 실행 (설정값보다 우선)
        #[arg(long, default_value = "false")]
        parallel: bool,
    },

    /// 지원 전략 목록 보기
    Strategies,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 계속 진행
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    init_logging(&config.logging).map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Backtest {
            asset,
            strategy,
            params,
            from,
            to,
            cash,
        } => {
            let cli_config = BacktestCliConfig {
                asset_id: asset,
                strategy_type: strategy,
                params,
                start_date: parse_date(&from)?,
                end_date: parse_date(&to)?,
                initial_cash: cash,
            };

            let service = build_service(&config);
            match run_backtest(&service, &cli_config).await {
                Ok(result) if cli.json => print_json(result.as_ref())?,
                Ok(result) => print_result(&result),
                Err(e) => {
                    error!("Backtest failed: {}", e);
                    return Err(e);
                }
            }
        }

        Commands::Compare { file, parallel } => {
            if parallel {
                config.backtest.parallel_strategies = true;
            }
            let request = load_request(&file)?;
            info!(file = %file.display(), "Loaded comparison request");

            let service = build_service(&config);
            match run_compare(&service, request).await {
                Ok(result) if cli.json => print_json(result.as_ref())?,
                Ok(result) => print_comparison(&result),
                Err(e) => {
                    error!("Comparison failed: {}", e);
                    return Err(e);
                }
            }
        }

        Commands::Strategies => {
            let strategies = trader_strategy::StrategyRegistry::all();
            if cli.json {
                print_json(&strategies)?;
            } else {
                print_strategies(strategies);
            }
        }
    }

    Ok(())
}

/// 설정으로 합성 데이터 기반 서비스를 생성합니다.
fn build_service(config: &AppConfig) -> BacktestService {
    let provider = Arc::new(SyntheticPriceProvider::new(config.data.synthetic_seed));
    BacktestService::new(provider, &config.backtest)
}
