//! 내장 전략 통합 테스트.
//!
//! 엔진 없이 원장(Portfolio)을 직접 넘겨가며 전략의 매매 시점을 검증합니다:
//! 1. 월말 로테이션의 매수/매도 트리거
//! 2. 매수 후 보유의 최초 매수, 리밸런싱, 마지막 날 청산

use chrono::{Datelike, NaiveDate, Weekday};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use trader_core::{Bar, Portfolio, TradeAction};
use trader_strategy::strategies::monthly_rotation::MonthlyRotationStrategy;
use trader_strategy::{
    BuyAndHoldParams, BuyAndHoldStrategy, MonthlyRotationParams, RebalanceFrequency, Strategy,
};

// ============================================================================
// 헬퍼 함수
// ============================================================================

/// 구간 내 평일 일봉 생성.
fn weekday_bars(start: NaiveDate, end: NaiveDate, price: impl Fn(usize) -> Decimal) -> Vec<Bar> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .enumerate()
        .map(|(i, d)| Bar::flat(d, price(i)))
        .collect()
}

/// 엔진과 같은 순서로 전략을 실행합니다.
fn drive(strategy: &mut dyn Strategy, bars: &[Bar], cash: Decimal) -> Portfolio {
    let mut portfolio = Portfolio::new(cash, dec!(0.0003));
    strategy.on_start(bars);
    for (i, bar) in bars.iter().enumerate() {
        strategy.on_bar(i, bar, &mut portfolio);
        if i + 1 == bars.len() {
            strategy.finalize(bar, &mut portfolio);
        }
        portfolio.mark_to_market(bar.close);
    }
    portfolio
}

/// 마지막 일봉의 청산 없이 `on_bar`만 진행합니다. 구간 중간 상태 검증용.
fn step_bars(strategy: &mut dyn Strategy, bars: &[Bar], cash: Decimal) -> Portfolio {
    let mut portfolio = Portfolio::new(cash, dec!(0.0003));
    strategy.on_start(bars);
    for (i, bar) in bars.iter().enumerate() {
        strategy.on_bar(i, bar, &mut portfolio);
        portfolio.mark_to_market(bar.close);
    }
    portfolio
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// 월말 로테이션
// ============================================================================

#[test]
fn test_rotation_buys_month_end_and_sells_month_start() {
    let bars = weekday_bars(date(2024, 1, 1), date(2024, 3, 31), |_| dec!(3000));
    let mut strategy = MonthlyRotationStrategy::new(MonthlyRotationParams::default());
    let portfolio = drive(&mut strategy, &bars, dec!(100000));

    let trades = portfolio.trades();
    let buys: Vec<_> = trades.iter().filter(|t| t.is_buy()).map(|t| t.date).collect();
    let sells: Vec<_> = trades.iter().filter(|t| !t.is_buy()).map(|t| t.date).collect();

    // 1월 31일(수), 2월 29일(목), 3월 29일(금)에 매수
    assert_eq!(buys, vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 29)]);
    // 2월 1일, 3월 1일 매도 + 마지막 일봉 강제 청산
    assert_eq!(sells, vec![date(2024, 2, 1), date(2024, 3, 1), date(2024, 3, 29)]);
    assert!(portfolio.is_flat());
}

#[test]
fn test_rotation_never_buys_while_holding() {
    // 매수 트리거가 매도 트리거보다 먼저 오는 짧은 달: 보유 중엔 추가 매수 없음
    let bars = weekday_bars(date(2024, 1, 1), date(2024, 2, 29), |_| dec!(47));
    let mut strategy = MonthlyRotationStrategy::new(MonthlyRotationParams {
        buy_days_before_month_end: 20,
        sell_days_after_month_start: 20,
    });
    let portfolio = drive(&mut strategy, &bars, dec!(10000));

    let mut holding = false;
    for trade in portfolio.trades() {
        match trade.action {
            TradeAction::Buy => {
                assert!(!holding, "buy while holding on {}", trade.date);
                holding = true;
            }
            TradeAction::Sell => {
                assert!(holding);
                holding = false;
            }
        }
    }
    assert!(!holding);
}

#[test]
fn test_rotation_skips_unaffordable_buy() {
    let bars = weekday_bars(date(2024, 1, 1), date(2024, 1, 31), |_| dec!(500));
    let mut strategy = MonthlyRotationStrategy::new(MonthlyRotationParams::default());
    let portfolio = drive(&mut strategy, &bars, dec!(400));

    assert!(portfolio.trades().is_empty());
    assert_eq!(portfolio.cash(), dec!(400));
}

// ============================================================================
// 매수 후 보유
// ============================================================================

#[test]
fn test_buy_and_hold_single_purchase_then_final_liquidation() {
    let bars = weekday_bars(date(2024, 1, 1), date(2024, 6, 28), |_| dec!(3000));
    let mut strategy = BuyAndHoldStrategy::new(BuyAndHoldParams::default());
    let portfolio = drive(&mut strategy, &bars, dec!(100000));

    let trades = portfolio.trades();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].action, TradeAction::Buy);
    assert_eq!(trades[0].quantity, dec!(33));
    assert_eq!(trades[1].action, TradeAction::Sell);
    assert_eq!(trades[1].quantity, dec!(33));
    assert_eq!(trades[1].date, date(2024, 6, 28));
    assert!(portfolio.is_flat());
}

#[test]
fn test_buy_and_hold_retries_initial_purchase() {
    // 첫 이틀은 가격이 현금보다 비싸서 매수 불가
    let bars = weekday_bars(date(2024, 1, 1), date(2024, 1, 12), |i| {
        if i < 2 {
            dec!(2000)
        } else {
            dec!(99)
        }
    });
    let mut strategy = BuyAndHoldStrategy::new(BuyAndHoldParams::default());
    let portfolio = drive(&mut strategy, &bars, dec!(1000));

    let trades = portfolio.trades();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].date, bars[2].date);
    assert_eq!(trades[0].quantity, dec!(10));
    assert_eq!(trades[1].action, TradeAction::Sell);
    assert_eq!(trades[1].date, bars.last().unwrap().date);
}

#[test]
fn test_buy_and_hold_monthly_rebalance_sells_excess() {
    // 50% 비중으로 시작해 가격이 3배가 되면 다음 달 리밸런싱에서 초과분 매도
    let bars = weekday_bars(date(2024, 1, 1), date(2024, 2, 29), |i| {
        if i < 10 {
            dec!(100)
        } else {
            dec!(300)
        }
    });
    let mut strategy = BuyAndHoldStrategy::new(BuyAndHoldParams {
        target_allocation: 0.5,
        rebalance_frequency: RebalanceFrequency::Monthly,
        dividend_reinvest: false,
    });
    let portfolio = step_bars(&mut strategy, &bars, dec!(10000));

    let trades = portfolio.trades();
    assert_eq!(trades[0].action, TradeAction::Buy);
    assert_eq!(trades[0].quantity, dec!(50));

    let rebalance = trades
        .iter()
        .find(|t| t.action == TradeAction::Sell)
        .expect("rebalance sell");
    assert_eq!(rebalance.date, date(2024, 2, 1));

    // 리밸런싱 후 비중은 목표에서 데드밴드 이내
    let price = dec!(300);
    let value = portfolio.cash() + portfolio.position().quantity * price;
    let weight = portfolio.position().quantity * price / value;
    assert!((weight - dec!(0.5)).abs() <= dec!(0.05));
}

#[test]
fn test_buy_and_hold_rebalance_buys_deficit_with_weighted_cost() {
    // 가격 하락으로 비중이 줄어들면 부족분 매수, 평균 단가는 가중 평균
    let bars = weekday_bars(date(2024, 1, 1), date(2024, 2, 29), |i| {
        if i < 10 {
            dec!(100)
        } else {
            dec!(40)
        }
    });
    let mut strategy = BuyAndHoldStrategy::new(BuyAndHoldParams {
        target_allocation: 0.5,
        rebalance_frequency: RebalanceFrequency::Monthly,
        dividend_reinvest: false,
    });
    let portfolio = step_bars(&mut strategy, &bars, dec!(10000));

    let buys: Vec<_> = portfolio.trades().iter().filter(|t| t.is_buy()).collect();
    assert_eq!(buys.len(), 2);
    assert_eq!(buys[1].date, date(2024, 2, 1));

    let pos = portfolio.position();
    let expected_avg = (dec!(100) * buys[0].quantity + dec!(40) * buys[1].quantity) / pos.quantity;
    assert_eq!(pos.avg_price, expected_avg);
}

// ============================================================================
// 속성 테스트
// ============================================================================

proptest! {
    /// 트리거 날짜는 항상 해당 월의 거래일이다.
    #[test]
    fn rotation_triggers_stay_in_month(buy in 1u32..=20, sell in 1u32..=20, skip in 0usize..15) {
        let mut bars = weekday_bars(date(2024, 4, 1), date(2024, 5, 31), |_| dec!(10));
        // 4월 앞쪽 일부를 잘라 짧은 달을 만든다
        bars.drain(..skip);

        let mut strategy = MonthlyRotationStrategy::new(MonthlyRotationParams {
            buy_days_before_month_end: buy,
            sell_days_after_month_start: sell,
        });
        strategy.on_start(&bars);

        for (y, m) in [(2024, 4), (2024, 5)] {
            let t = strategy.triggers_for(y, m).unwrap();
            prop_assert!(bars.iter().any(|b| b.date == t.buy_date));
            prop_assert!(bars.iter().any(|b| b.date == t.sell_date));
            prop_assert_eq!(t.buy_date.month(), m);
            prop_assert_eq!(t.sell_date.month(), m);
        }
    }
}
