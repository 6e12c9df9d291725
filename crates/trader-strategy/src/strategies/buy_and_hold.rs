//! 매수 후 보유 전략 (선택적 리밸런싱).
//!
//! # 전략 로직
//! - 매수 가능한 첫 일봉에서 `현금 × target_allocation`만큼 정수 단위 매수
//! - 리밸런싱 주기가 도래하면 목표 비중과 현재 비중을 비교해
//!   차이가 포트폴리오 가치의 5%를 넘을 때만 초과분 매도 / 부족분 매수
//! - 마지막 일봉에서 보유 수량 전량 청산

use crate::config::{BuyAndHoldParams, RebalanceFrequency, BUY_AND_HOLD};
use crate::Strategy;
use chrono::Datelike;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;
use trader_core::{whole_units, Bar, DecimalExt, Portfolio};

/// 리밸런싱 데드밴드 (포트폴리오 가치 대비).
pub const REBALANCE_DEADBAND: Decimal = dec!(0.05);

/// 매수 후 보유 전략.
#[derive(Debug, Clone)]
pub struct BuyAndHoldStrategy {
    params: BuyAndHoldParams,
    allocation: Decimal,
    initial_purchase_done: bool,
    /// 마지막 리밸런싱 마커.
    ///
    /// 월간/분기는 월 번호(1~12), 연간은 `연도×12+월`을 기록합니다.
    /// 연도를 구분하지 않는 월 번호라서, 예를 들어 1년차 1월과 2년차 1월이
    /// 연속 일봉이면 월간 주기는 두 번째 1월에 발동하지 않습니다.
    last_rebalance_marker: i32,
}

impl BuyAndHoldStrategy {
    /// 새 전략을 생성합니다.
    pub fn new(params: BuyAndHoldParams) -> Self {
        Self {
            params,
            allocation: Decimal::from_f64(params.target_allocation).unwrap_or(Decimal::ONE),
            initial_purchase_done: false,
            last_rebalance_marker: -1,
        }
    }

    /// 리밸런싱 주기가 도래했는지 판단하고 마커를 갱신합니다.
    fn should_rebalance(&mut self, bar: &Bar) -> bool {
        let month = bar.date.month() as i32;
        let year = bar.date.year();

        let marker = match self.params.rebalance_frequency {
            RebalanceFrequency::Never => return false,
            RebalanceFrequency::Monthly => month,
            RebalanceFrequency::Quarterly if month % 3 == 1 => month,
            RebalanceFrequency::Quarterly => return false,
            RebalanceFrequency::Yearly if month == 1 => year * 12 + month,
            RebalanceFrequency::Yearly => return false,
        };

        if self.last_rebalance_marker == marker {
            return false;
        }
        self.last_rebalance_marker = marker;
        true
    }

    fn rebalance(&self, bar: &Bar, portfolio: &mut Portfolio) {
        let price = bar.close;
        let total_value = portfolio.value_at(price);
        let target_value = total_value * self.allocation;
        let current_value = portfolio.position().quantity * price;

        let gap = current_value - target_value;
        if gap.abs() <= total_value * REBALANCE_DEADBAND {
            return;
        }

        debug!(
            date = %bar.date,
            current = current_value.to_f64_lossy(),
            target = target_value.to_f64_lossy(),
            "Rebalancing position"
        );

        if gap > Decimal::ZERO {
            let excess = whole_units(gap, price);
            portfolio.sell(bar.date, price, excess);
        } else {
            let deficit = whole_units(-gap, price);
            portfolio.buy(bar.date, price, deficit);
        }
    }
}

impl Strategy for BuyAndHoldStrategy {
    fn name(&self) -> &str {
        BUY_AND_HOLD
    }

    fn on_bar(&mut self, _index: usize, bar: &Bar, portfolio: &mut Portfolio) {
        if !self.initial_purchase_done {
            let quantity = whole_units(portfolio.cash() * self.allocation, bar.close);
            if portfolio.buy(bar.date, bar.close, quantity).is_some() {
                self.initial_purchase_done = true;
            }
        }

        if self.should_rebalance(bar) {
            self.rebalance(bar, portfolio);
        }
    }

    fn finalize(&mut self, bar: &Bar, portfolio: &mut Portfolio) {
        if !portfolio.is_flat() {
            debug!(date = %bar.date, "Liquidating buy-and-hold position at end of window");
            portfolio.sell_all(bar.date, bar.close);
        }
    }
}
