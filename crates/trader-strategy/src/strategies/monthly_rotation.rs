//! 월말 매수 / 월초 매도 로테이션 전략.
//!
//! # 전략 로직
//! - 각 달의 거래일을 오름차순으로 나열했을 때
//!   - 매수일: `count - buy_days_before_month_end` 번째 (0 미만이면 첫 거래일)
//!   - 매도일: `sell_days_after_month_start - 1` 번째 (범위를 넘으면 마지막 거래일)
//! - 매수일에 무포지션이면 현금 전부로 정수 단위 매수
//! - 매도일에 보유 중이면 전량 매도
//! - 같은 일봉에서는 매수 판단이 매도 판단보다 먼저
//! - 마지막 일봉까지 남은 포지션은 종가에 강제 청산

use crate::config::{MonthlyRotationParams, MONTHLY_ROTATION};
use crate::Strategy;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;
use trader_core::{whole_units, Bar, Portfolio};

/// 한 달의 매수/매도 트리거 날짜.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthTriggers {
    pub buy_date: NaiveDate,
    pub sell_date: NaiveDate,
}

/// 월말 로테이션 전략.
#[derive(Debug, Clone)]
pub struct MonthlyRotationStrategy {
    params: MonthlyRotationParams,
    /// (연도, 월) → 트리거 날짜
    triggers: HashMap<(i32, u32), MonthTriggers>,
}

impl MonthlyRotationStrategy {
    /// 새 전략을 생성합니다.
    pub fn new(params: MonthlyRotationParams) -> Self {
        Self {
            params,
            triggers: HashMap::new(),
        }
    }

    /// 해당 월의 트리거 날짜.
    pub fn triggers_for(&self, year: i32, month: u32) -> Option<MonthTriggers> {
        self.triggers.get(&(year, month)).copied()
    }

    /// 오름차순 거래일 목록에서 트리거 날짜를 고릅니다.
    fn pick_triggers(&self, dates: &[NaiveDate]) -> Option<MonthTriggers> {
        let last = dates.len().checked_sub(1)?;
        let buy_index = dates
            .len()
            .saturating_sub(self.params.buy_days_before_month_end as usize);
        let sell_index =
            (self.params.sell_days_after_month_start as usize).saturating_sub(1).min(last);

        Some(MonthTriggers {
            buy_date: dates[buy_index.min(last)],
            sell_date: dates[sell_index],
        })
    }
}

impl Strategy for MonthlyRotationStrategy {
    fn name(&self) -> &str {
        MONTHLY_ROTATION
    }

    fn on_start(&mut self, bars: &[Bar]) {
        let mut months: HashMap<(i32, u32), Vec<NaiveDate>> = HashMap::new();
        for bar in bars {
            months.entry(bar.year_month()).or_default().push(bar.date);
        }

        self.triggers = months
            .into_iter()
            .filter_map(|(key, mut dates)| {
                dates.sort();
                self.pick_triggers(&dates).map(|t| (key, t))
            })
            .collect();

        debug!(months = self.triggers.len(), "Monthly rotation triggers prepared");
    }

    fn on_bar(&mut self, _index: usize, bar: &Bar, portfolio: &mut Portfolio) {
        let (year, month) = bar.year_month();
        let Some(triggers) = self.triggers_for(year, month) else {
            return;
        };

        if bar.date == triggers.buy_date && portfolio.is_flat() {
            let quantity = whole_units(portfolio.cash(), bar.close);
            portfolio.buy(bar.date, bar.close, quantity);
        }

        if bar.date == triggers.sell_date && !portfolio.is_flat() {
            portfolio.sell_all(bar.date, bar.close);
        }
    }

    fn finalize(&mut self, bar: &Bar, portfolio: &mut Portfolio) {
        if !portfolio.is_flat() {
            debug!(date = %bar.date, "Force closing open position at end of window");
            portfolio.sell_all(bar.date, bar.close);
        }
    }
}
