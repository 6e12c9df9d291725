//! 체결 기록.

use crate::types::{Amount, Price, Quantity};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 매매 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "buy"),
            TradeAction::Sell => write!(f, "sell"),
        }
    }
}

/// 한 번의 체결.
///
/// 기록된 후에는 변경되지 않으며, 실행 단위로 시간순 append-only 목록에 쌓입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// 체결일
    pub date: NaiveDate,
    /// 매매 방향
    pub action: TradeAction,
    /// 체결가
    pub price: Price,
    /// 체결 수량
    pub quantity: Quantity,
    /// 체결 금액 (price × quantity)
    pub amount: Amount,
    /// 수수료 (amount × rate)
    pub commission: Decimal,
}

impl Trade {
    /// 체결 기록을 생성합니다. 금액과 수수료는 여기서 계산됩니다.
    pub fn new(
        date: NaiveDate,
        action: TradeAction,
        price: Price,
        quantity: Quantity,
        commission_rate: Decimal,
    ) -> Self {
        let amount = price * quantity;
        Self {
            date,
            action,
            price,
            quantity,
            amount,
            commission: amount * commission_rate,
        }
    }

    /// 매수인지 확인합니다.
    pub fn is_buy(&self) -> bool {
        self.action == TradeAction::Buy
    }

    /// 현금 흐름 (매수: -(금액+수수료), 매도: 금액-수수료).
    pub fn cash_flow(&self) -> Decimal {
        match self.action {
            TradeAction::Buy => -(self.amount + self.commission),
            TradeAction::Sell => self.amount - self.commission,
        }
    }
}
