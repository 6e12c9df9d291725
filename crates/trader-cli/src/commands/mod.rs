//! CLI 명령어 구현 모듈.

pub mod backtest;
pub mod compare;
pub mod strategies;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// YYYY-MM-DD 형식 날짜 파싱.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| anyhow!("Invalid date '{}': {}. Use YYYY-MM-DD", s, e))
}

/// 값을 보기 좋은 JSON으로 stdout에 출력합니다.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
