//! 단일 자산 백테스트용 현금/포지션 원장.
//!
//! 엔진이 실행마다 하나의 `Portfolio`를 소유하고, 전략은 `buy`/`sell`을 통해서만
//! 거래합니다. 현금 부족 매수와 보유량을 초과하는 매도는 체결되지 않습니다.

use crate::domain::{Position, Trade, TradeAction};
use crate::types::{Amount, Price, Quantity};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

/// 현금, 포지션, 체결 내역을 관리하는 원장.
#[derive(Debug, Clone)]
pub struct Portfolio {
    initial_cash: Amount,
    cash: Amount,
    position: Position,
    commission_rate: Decimal,
    trades: Vec<Trade>,
}

impl Portfolio {
    /// 새 원장을 생성합니다.
    pub fn new(initial_cash: Amount, commission_rate: Decimal) -> Self {
        Self {
            initial_cash,
            cash: initial_cash,
            position: Position::flat(),
            commission_rate,
            trades: Vec::new(),
        }
    }

    pub fn initial_cash(&self) -> Amount {
        self.initial_cash
    }

    pub fn cash(&self) -> Amount {
        self.cash
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn commission_rate(&self) -> Decimal {
        self.commission_rate
    }

    /// 지금까지의 체결 내역 (시간순).
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// 무포지션인지 확인합니다.
    pub fn is_flat(&self) -> bool {
        self.position.is_flat()
    }

    /// 현금 + 평가 금액.
    pub fn total_value(&self) -> Amount {
        self.cash + self.position.market_value
    }

    /// 주어진 가격 기준 평가 총액 (마킹 없이 계산).
    pub fn value_at(&self, price: Price) -> Amount {
        self.cash + self.position.quantity * price
    }

    /// 매수합니다.
    ///
    /// 수량·가격이 양수이고 체결 금액 + 수수료가 현금 이하일 때만 체결됩니다.
    pub fn buy(&mut self, date: NaiveDate, price: Price, quantity: Quantity) -> Option<Trade> {
        if quantity <= Decimal::ZERO || price <= Decimal::ZERO {
            return None;
        }

        let trade = Trade::new(date, TradeAction::Buy, price, quantity, self.commission_rate);
        let cost = trade.amount + trade.commission;
        if cost > self.cash {
            debug!(%date, %price, %quantity, %cost, cash = %self.cash, "Buy skipped: insufficient cash");
            return None;
        }

        self.cash -= cost;
        self.position.add(quantity, price);
        self.position.mark(price);
        debug!(%date, %price, %quantity, commission = %trade.commission, "Buy filled");

        self.trades.push(trade.clone());
        Some(trade)
    }

    /// 매도합니다.
    ///
    /// 수량이 0 이하이거나 보유량을 초과하면 체결되지 않습니다.
    pub fn sell(&mut self, date: NaiveDate, price: Price, quantity: Quantity) -> Option<Trade> {
        if quantity <= Decimal::ZERO || quantity > self.position.quantity {
            return None;
        }

        let trade = Trade::new(date, TradeAction::Sell, price, quantity, self.commission_rate);
        self.cash += trade.amount - trade.commission;
        self.position.reduce(quantity);
        self.position.mark(price);
        debug!(%date, %price, %quantity, commission = %trade.commission, "Sell filled");

        self.trades.push(trade.clone());
        Some(trade)
    }

    /// 보유 수량 전부를 매도합니다.
    pub fn sell_all(&mut self, date: NaiveDate, price: Price) -> Option<Trade> {
        let quantity = self.position.quantity;
        self.sell(date, price, quantity)
    }

    /// 종가로 포지션을 평가합니다.
    pub fn mark_to_market(&mut self, price: Price) {
        self.position.mark(price);
    }

    /// 체결 내역을 꺼냅니다.
    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }
}
