//! 일별 포트폴리오 스냅샷.

use crate::domain::Position;
use crate::types::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 하루치 자산 곡선 포인트.
///
/// `portfolio_value`는 기록 시점의 `cash + position.market_value`와 항상 같습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub portfolio_value: Amount,
    /// 전일 대비 수익률
    pub daily_return: f64,
    /// 초기 자본 대비 누적 수익률
    pub cumulative_return: f64,
    /// 고점 대비 하락률 (0 ~ 1)
    pub drawdown: f64,
    pub cash: Amount,
    pub position: Position,
}
