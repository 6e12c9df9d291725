//! 단일 자산 포지션.

use crate::types::{Amount, Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 한 번의 백테스트 실행이 소유하는 롱 포지션.
///
/// 수량 0은 무포지션(flat)을 의미합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// 보유 수량 (항상 0 이상)
    pub quantity: Quantity,
    /// 평균 매입가
    pub avg_price: Price,
    /// 평가 금액
    pub market_value: Amount,
    /// 미실현 손익
    pub unrealized_pnl: Decimal,
}

impl Position {
    /// 무포지션.
    pub fn flat() -> Self {
        Self::default()
    }

    /// 무포지션인지 확인합니다.
    pub fn is_flat(&self) -> bool {
        self.quantity <= Decimal::ZERO
    }

    /// 매수 체결을 반영합니다. 평균 매입가는 수량 가중 평균으로 갱신됩니다.
    pub fn add(&mut self, quantity: Quantity, price: Price) {
        let new_quantity = self.quantity + quantity;
        if new_quantity <= Decimal::ZERO {
            return;
        }
        self.avg_price = (self.avg_price * self.quantity + price * quantity) / new_quantity;
        self.quantity = new_quantity;
    }

    /// 매도 체결을 반영합니다. 전량 매도 시 무포지션으로 초기화됩니다.
    pub fn reduce(&mut self, quantity: Quantity) {
        self.quantity -= quantity;
        if self.quantity <= Decimal::ZERO {
            *self = Position::flat();
        }
    }

    /// 종가 기준으로 평가 금액과 미실현 손익을 갱신합니다.
    pub fn mark(&mut self, price: Price) {
        if self.is_flat() {
            self.market_value = Decimal::ZERO;
            self.unrealized_pnl = Decimal::ZERO;
            return;
        }
        self.market_value = self.quantity * price;
        self.unrealized_pnl = self.market_value - self.quantity * self.avg_price;
    }
}
