//! 백테스트 명령어.
//!
//! 단일 전략을 한 자산에 대해 백테스트합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # CSI 300 월말 로테이션 (기본 파라미터)
//! trader backtest -a csi300 -s monthly_rotation -f 2023-01-01 -t 2023-12-31
//!
//! # 파라미터 지정
//! trader backtest -a sse50 -s buy_and_hold -p target_allocation=0.8 -p rebalance_frequency=monthly \
//!     -f 2023-01-01 -t 2023-12-31 --cash 500000
//! ```

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use trader_analytics::{BacktestRequest, BacktestResult, BacktestService};
use trader_strategy::StrategyConfig;

/// 백테스트 CLI 설정.
#[derive(Debug, Clone)]
pub struct BacktestCliConfig {
    /// 자산 ID
    pub asset_id: String,
    /// 전략 타입
    pub strategy_type: String,
    /// `key=value` 형식 파라미터
    pub params: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 초기 자본
    pub initial_cash: Decimal,
}

impl BacktestCliConfig {
    /// 서비스 요청으로 변환합니다.
    pub fn to_request(&self) -> Result<BacktestRequest> {
        let strategy = self
            .params
            .iter()
            .map(|p| parse_param(p))
            .try_fold(StrategyConfig::new(&self.strategy_type), |config, param| {
                let (key, value) = param?;
                Ok::<_, anyhow::Error>(config.with_param(key, value))
            })?;

        Ok(BacktestRequest::new(
            self.asset_id.clone(),
            strategy,
            self.start_date,
            self.end_date,
            self.initial_cash,
        ))
    }
}

/// `key=value` 파라미터 파싱.
///
/// 값은 JSON으로 해석을 시도하고 (`1`, `0.5`, `true`), 실패하면 문자열로 둡니다.
pub fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid parameter '{}'. Use key=value", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("Empty parameter name in '{}'", raw));
    }

    let value = value.trim();
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// 백테스트 실행.
pub async fn run_backtest(
    service: &BacktestService,
    config: &BacktestCliConfig,
) -> Result<Arc<BacktestResult>> {
    info!(
        asset = %config.asset_id,
        strategy = %config.strategy_type,
        provider = service.provider_name(),
        "Running backtest"
    );

    let request = config.to_request()?;
    let result = service.run_backtest(request).await?;
    Ok(result)
}

/// 결과를 사람이 읽는 형식으로 출력합니다.
pub fn print_result(result: &BacktestResult) {
    println!("{}", result.summary());

    if result.trades.is_empty() {
        println!("\n거래 없음");
        return;
    }

    println!("\n거래 내역 ({}건)", result.trades.len());
    println!(
        "{:<12} {:<6} {:>14} {:>12} {:>16} {:>12}",
        "날짜", "구분", "가격", "수량", "금액", "수수료"
    );
    for trade in &result.trades {
        println!(
            "{:<12} {:<6} {:>14} {:>12} {:>16} {:>12}",
            trade.date.to_string(),
            trade.action.to_string(),
            trade.price.round_dp(2).to_string(),
            trade.quantity.to_string(),
            trade.amount.round_dp(2).to_string(),
            trade.commission.round_dp(2).to_string(),
        );
    }
}
