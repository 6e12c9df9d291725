//! 성과 지표 계산 모듈
//!
//! 백테스트의 일별 자산 곡선과 거래 기록에서 성과 지표를 계산합니다:
//! - 수익률: 총 수익률, 연율화 수익률
//! - 위험: 변동성, 최대 낙폭, 낙폭 지속/회복 기간
//! - 위험 조정 수익: 샤프, 소르티노, 칼마 비율
//! - 거래 통계: 라운드트립 승률, 프로핏 팩터, 평균/최대 손익률
//!
//! 모든 나눗셈은 분모가 0인 경우를 처리하며, 유리한 방향으로 상한이 없는
//! 비율은 [`Ratio::Unbounded`]로 표현합니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use trader_analytics::performance::MetricsCalculator;
//!
//! let metrics = MetricsCalculator::new(0.03).calculate(&daily, &trades);
//! println!("{}", metrics.summary());
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trader_core::{Amount, DailyPoint, DecimalExt, Price, Quantity, Ratio, Trade, TradeAction};

/// 연간 거래일 수 (연율화 계산에 사용)
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// 기본 무위험 이자율 (연간, 0.03 = 3%)
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.03;

/// 라운드트립 거래 (매수부터 매도까지)
///
/// 매도 체결은 아직 짝지어지지 않은 가장 최근 매수와 짝을 이룹니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTrip {
    /// 매수일
    pub entry_date: NaiveDate,
    /// 매도일
    pub exit_date: NaiveDate,
    pub entry_price: Price,
    pub exit_price: Price,
    /// 매도 수량
    pub quantity: Quantity,
    /// 매수 + 매도 수수료
    pub fees: Amount,
    /// 수수료 차감 후 순손익
    pub pnl: Amount,
    /// 투입 원가 대비 순손익 비율 (0.05 = 5%)
    pub return_pct: f64,
}

impl RoundTrip {
    /// 매수/매도 체결 한 쌍으로 라운드트립을 생성합니다.
    ///
    /// 순손익 = (매도가 - 매수가) × 매도 수량 - (매도 수수료 + 매수 수수료)
    /// 수익률 = 순손익 / (매수가 × 매도 수량 + 매수 수수료)
    pub fn from_pair(buy: &Trade, sell: &Trade) -> Self {
        let fees = buy.commission + sell.commission;
        let pnl = (sell.price - buy.price) * sell.quantity - fees;
        let cost_basis = buy.price * sell.quantity + buy.commission;
        let return_pct = pnl
            .checked_ratio(cost_basis)
            .map(|r| r.to_f64_lossy())
            .unwrap_or(0.0);

        Self {
            entry_date: buy.date,
            exit_date: sell.date,
            entry_price: buy.price,
            exit_price: sell.price,
            quantity: sell.quantity,
            fees,
            pnl,
            return_pct,
        }
    }

    /// 수익 거래 여부
    pub fn is_winner(&self) -> bool {
        self.return_pct > 0.0
    }

    /// 손실 거래 여부
    pub fn is_loser(&self) -> bool {
        self.return_pct < 0.0
    }
}

/// 거래 목록을 라운드트립으로 묶습니다.
///
/// 대기 중인 매수는 하나만 유지합니다. 새 매수는 이전 대기 매수를 대체하고,
/// 대기 매수가 없는 매도는 무시됩니다.
pub fn pair_round_trips(trades: &[Trade]) -> Vec<RoundTrip> {
    let mut pending: Option<&Trade> = None;
    let mut round_trips = Vec::new();

    for trade in trades {
        match trade.action {
            TradeAction::Buy => pending = Some(trade),
            TradeAction::Sell => {
                if let Some(buy) = pending.take() {
                    round_trips.push(RoundTrip::from_pair(buy, trade));
                }
            }
        }
    }

    round_trips
}

/// 한 번의 백테스트에 대한 성과 지표.
///
/// 비율 값은 모두 소수 표현입니다 (0.05 = 5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// 총 수익률
    pub total_return: f64,
    /// 연율화 수익률
    pub annualized_return: f64,
    /// 최대 낙폭 (0 ~ 1)
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: Ratio,
    /// 연율화 변동성
    pub volatility: f64,
    /// 라운드트립 승률
    pub win_rate: f64,
    pub profit_factor: Ratio,
    pub calmar_ratio: Ratio,

    /// 총 라운드트립 수 (본전 거래 포함)
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub avg_winning_trade: f64,
    /// 평균 손실률 (음수)
    pub avg_losing_trade: f64,
    pub max_winning_trade: f64,
    /// 최대 손실률 (가장 작은 음수)
    pub max_losing_trade: f64,

    /// 낙폭이 지속된 최장 일수
    pub max_drawdown_period: usize,
    /// 최대 낙폭 구간 시작부터 회복까지 일수
    pub recovery_period: usize,

    /// 총 수수료
    pub total_commission: Amount,
    /// 최종 포트폴리오 가치
    pub final_value: Amount,
    /// 일별 포인트 수
    pub trading_days: usize,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self {
            total_return: 0.0,
            annualized_return: 0.0,
            max_drawdown: 0.0,
            sharpe_ratio: 0.0,
            sortino_ratio: Ratio::ZERO,
            volatility: 0.0,
            win_rate: 0.0,
            profit_factor: Ratio::ZERO,
            calmar_ratio: Ratio::ZERO,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            avg_winning_trade: 0.0,
            avg_losing_trade: 0.0,
            max_winning_trade: 0.0,
            max_losing_trade: 0.0,
            max_drawdown_period: 0,
            recovery_period: 0,
            total_commission: Decimal::ZERO,
            final_value: Decimal::ZERO,
            trading_days: 0,
        }
    }
}

impl PerformanceMetrics {
    /// 한 줄 요약 문자열.
    pub fn summary(&self) -> String {
        format!(
            "수익률: {:.2}% | 연율화: {:.2}% | 샤프: {:.2} | 소르티노: {:.2} | MDD: {:.2}% | 거래: {} | 승률: {:.1}% | PF: {:.2}",
            self.total_return * 100.0,
            self.annualized_return * 100.0,
            self.sharpe_ratio,
            self.sortino_ratio,
            self.max_drawdown * 100.0,
            self.total_trades,
            self.win_rate * 100.0,
            self.profit_factor,
        )
    }
}

/// 라운드트립 기반 거래 통계.
#[derive(Debug, Clone, Default, PartialEq)]
struct TradeStats {
    total: usize,
    winning: usize,
    losing: usize,
    win_rate: f64,
    profit_factor: Ratio,
    avg_win: f64,
    avg_loss: f64,
    max_win: f64,
    max_loss: f64,
}

impl TradeStats {
    fn from_round_trips(round_trips: &[RoundTrip]) -> Self {
        if round_trips.is_empty() {
            return Self::default();
        }

        let wins: Vec<f64> = round_trips
            .iter()
            .filter(|rt| rt.is_winner())
            .map(|rt| rt.return_pct)
            .collect();
        let losses: Vec<f64> = round_trips
            .iter()
            .filter(|rt| rt.is_loser())
            .map(|rt| rt.return_pct)
            .collect();

        let gross_win: f64 = wins.iter().sum();
        let gross_loss: f64 = losses.iter().map(|l| l.abs()).sum();

        let profit_factor = if wins.is_empty() {
            Ratio::ZERO
        } else if gross_loss > 0.0 {
            Ratio::Finite(gross_win / gross_loss)
        } else {
            Ratio::Unbounded
        };

        Self {
            total: round_trips.len(),
            winning: wins.len(),
            losing: losses.len(),
            win_rate: wins.len() as f64 / round_trips.len() as f64,
            profit_factor,
            avg_win: mean(&wins),
            avg_loss: mean(&losses),
            max_win: wins.iter().copied().fold(0.0, f64::max),
            max_loss: losses.iter().copied().fold(0.0, f64::min),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// 성과 지표 계산기.
///
/// 상태가 없는 순수 계산이며, 무위험 이자율만 설정으로 받습니다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsCalculator {
    risk_free_rate: f64,
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_RISK_FREE_RATE)
    }
}

impl MetricsCalculator {
    /// 연간 무위험 이자율로 계산기를 생성합니다.
    pub fn new(risk_free_rate: f64) -> Self {
        Self { risk_free_rate }
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// 일별 자산 곡선과 거래 기록으로 성과 지표를 계산합니다.
    ///
    /// 빈 자산 곡선이면 모든 값이 0인 지표를 반환합니다.
    pub fn calculate(&self, daily: &[DailyPoint], trades: &[Trade]) -> PerformanceMetrics {
        let (first, last) = match (daily.first(), daily.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return PerformanceMetrics::default(),
        };

        let initial = first.portfolio_value.to_f64_lossy();
        let final_value = last.portfolio_value.to_f64_lossy();
        let total_return = if initial > 0.0 {
            (final_value - initial) / initial
        } else {
            0.0
        };
        let annualized_return = annualize_return(total_return, daily.len());

        // 첫날 수익률은 항상 0이므로 제외
        let returns: Vec<f64> = daily.iter().skip(1).map(|p| p.daily_return).collect();

        let volatility = annualized_volatility(&returns);
        let max_drawdown = daily.iter().map(|p| p.drawdown).fold(0.0, f64::max);

        let sharpe_ratio = if volatility == 0.0 {
            0.0
        } else {
            (annualized_return - self.risk_free_rate) / volatility
        };
        let sortino_ratio = self.sortino_ratio(&returns);
        let calmar_ratio = calmar_ratio(annualized_return, max_drawdown);

        let drawdowns: Vec<f64> = daily.iter().map(|p| p.drawdown).collect();
        let (max_drawdown_period, recovery_period) = drawdown_periods(&drawdowns);

        let stats = TradeStats::from_round_trips(&pair_round_trips(trades));

        PerformanceMetrics {
            total_return,
            annualized_return,
            max_drawdown,
            sharpe_ratio,
            sortino_ratio,
            volatility,
            win_rate: stats.win_rate,
            profit_factor: stats.profit_factor,
            calmar_ratio,
            total_trades: stats.total,
            winning_trades: stats.winning,
            losing_trades: stats.losing,
            avg_winning_trade: stats.avg_win,
            avg_losing_trade: stats.avg_loss,
            max_winning_trade: stats.max_win,
            max_losing_trade: stats.max_loss,
            max_drawdown_period,
            recovery_period,
            total_commission: trades.iter().map(|t| t.commission).sum(),
            final_value: last.portfolio_value,
            trading_days: daily.len(),
        }
    }

    /// 소르티노 비율.
    ///
    /// 하방 기준은 일간 무위험 수익률입니다. 하방 분산은 기준 미만 샘플의
    /// 제곱 편차 합을 전체 샘플 수로 나눕니다.
    pub fn sortino_ratio(&self, returns: &[f64]) -> Ratio {
        if returns.is_empty() {
            return Ratio::ZERO;
        }

        let days = TRADING_DAYS_PER_YEAR as f64;
        let threshold = self.risk_free_rate / days;

        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < threshold).collect();
        if downside.is_empty() {
            return Ratio::Unbounded;
        }

        let variance =
            downside.iter().map(|r| (r - threshold).powi(2)).sum::<f64>() / returns.len() as f64;
        let deviation = variance.sqrt() * days.sqrt();
        if deviation == 0.0 {
            return Ratio::Unbounded;
        }

        Ratio::Finite((mean(returns) * days - self.risk_free_rate) / deviation)
    }
}

/// 총 수익률을 연율화합니다.
///
/// 연수 = 일수 / 252. 연수가 0 이하이거나 원금 전액 손실이면 0.
pub fn annualize_return(total_return: f64, days: usize) -> f64 {
    let years = days as f64 / TRADING_DAYS_PER_YEAR as f64;
    if years <= 0.0 || total_return <= -1.0 {
        return 0.0;
    }
    (1.0 + total_return).powf(1.0 / years) - 1.0
}

/// 일간 수익률의 표본 표준편차(n-1)를 연율화합니다. 샘플이 2개 미만이면 0.
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let avg = mean(returns);
    let variance =
        returns.iter().map(|r| (r - avg).powi(2)).sum::<f64>() / (returns.len() - 1) as f64;
    variance.sqrt() * (TRADING_DAYS_PER_YEAR as f64).sqrt()
}

/// 칼마 비율 = 연율화 수익률 / 최대 낙폭.
pub fn calmar_ratio(annualized_return: f64, max_drawdown: f64) -> Ratio {
    if max_drawdown > 0.0 {
        Ratio::Finite(annualized_return / max_drawdown)
    } else if annualized_return > 0.0 {
        Ratio::Unbounded
    } else {
        Ratio::ZERO
    }
}

/// (최장 낙폭 지속 일수, 회복 일수)를 계산합니다.
///
/// 회복 일수는 최대 낙폭을 포함한 구간의 시작일부터 낙폭이 처음 0으로
/// 돌아온 날까지입니다. 회복하지 못했으면 시작일부터 남은 일수입니다.
pub fn drawdown_periods(drawdowns: &[f64]) -> (usize, usize) {
    let mut longest = 0;
    let mut current = 0;
    let mut worst = 0.0;
    let mut worst_start: Option<usize> = None;

    for (i, &dd) in drawdowns.iter().enumerate() {
        if dd > 0.0 {
            current += 1;
            if dd > worst {
                worst = dd;
                worst_start = Some(i + 1 - current);
            }
        } else {
            longest = longest.max(current);
            current = 0;
        }
    }
    longest = longest.max(current);

    let recovery = match worst_start {
        Some(start) => drawdowns[start..]
            .iter()
            .position(|dd| *dd <= 0.0)
            .unwrap_or(drawdowns.len() - start),
        None => 0,
    };

    (longest, recovery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trader_core::Position;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn point(day: u32, value: Decimal, daily_return: f64, drawdown: f64) -> DailyPoint {
        DailyPoint {
            date: d(day),
            portfolio_value: value,
            daily_return,
            cumulative_return: 0.0,
            drawdown,
            cash: value,
            position: Position::flat(),
        }
    }

    fn trade(day: u32, action: TradeAction, price: Decimal, qty: Decimal) -> Trade {
        Trade::new(d(day), action, price, qty, dec!(0.001))
    }

    #[test]
    fn test_round_trip_pnl() {
        let buy = trade(2, TradeAction::Buy, dec!(100), dec!(10));
        let sell = trade(5, TradeAction::Sell, dec!(110), dec!(10));
        let rt = RoundTrip::from_pair(&buy, &sell);

        // 수수료: 1.0 + 1.1
        assert_eq!(rt.fees, dec!(2.1));
        assert_eq!(rt.pnl, dec!(97.9));
        assert!((rt.return_pct - 97.9 / 1001.0).abs() < 1e-12);
        assert!(rt.is_winner());
    }

    #[test]
    fn test_pairing_uses_latest_buy() {
        let trades = vec![
            trade(2, TradeAction::Sell, dec!(100), dec!(1)), // 대기 매수 없음
            trade(3, TradeAction::Buy, dec!(100), dec!(1)),
            trade(4, TradeAction::Sell, dec!(120), dec!(1)),
            trade(5, TradeAction::Buy, dec!(100), dec!(1)),
            trade(8, TradeAction::Buy, dec!(90), dec!(1)),
            trade(9, TradeAction::Sell, dec!(80), dec!(1)),
        ];
        let rts = pair_round_trips(&trades);
        assert_eq!(rts.len(), 2);
        assert_eq!(rts[1].entry_price, dec!(90));
        assert!(rts[1].is_loser());
    }

    #[test]
    fn test_empty_input_is_zero() {
        let metrics = MetricsCalculator::default().calculate(&[], &[]);
        assert_eq!(metrics, PerformanceMetrics::default());
    }

    #[test]
    fn test_trade_stats() {
        let trades = vec![
            trade(2, TradeAction::Buy, dec!(100), dec!(10)),
            trade(3, TradeAction::Sell, dec!(120), dec!(10)),
            trade(4, TradeAction::Buy, dec!(100), dec!(10)),
            trade(5, TradeAction::Sell, dec!(90), dec!(10)),
            trade(8, TradeAction::Buy, dec!(100), dec!(10)),
            trade(9, TradeAction::Sell, dec!(105), dec!(10)),
        ];
        let daily = vec![point(2, dec!(1000), 0.0, 0.0)];
        let m = MetricsCalculator::default().calculate(&daily, &trades);

        assert_eq!(m.total_trades, 3);
        assert_eq!(m.winning_trades, 2);
        assert_eq!(m.losing_trades, 1);
        assert!((m.win_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!(m.avg_losing_trade < 0.0);
        assert_eq!(m.max_losing_trade, m.avg_losing_trade);
        assert!(m.max_winning_trade > m.avg_winning_trade);
        assert!(matches!(m.profit_factor, Ratio::Finite(pf) if pf > 1.0));
        assert_eq!(m.total_commission, trades.iter().map(|t| t.commission).sum::<Decimal>());
    }

    #[test]
    fn test_profit_factor_sentinels() {
        let only_wins = vec![
            trade(2, TradeAction::Buy, dec!(100), dec!(1)),
            trade(3, TradeAction::Sell, dec!(150), dec!(1)),
        ];
        let daily = vec![point(2, dec!(1000), 0.0, 0.0)];
        let calc = MetricsCalculator::default();
        assert_eq!(calc.calculate(&daily, &only_wins).profit_factor, Ratio::Unbounded);

        let only_losses = vec![
            trade(2, TradeAction::Buy, dec!(100), dec!(1)),
            trade(3, TradeAction::Sell, dec!(50), dec!(1)),
        ];
        let m = calc.calculate(&daily, &only_losses);
        assert_eq!(m.profit_factor, Ratio::ZERO);
        assert_eq!(m.win_rate, 0.0);
    }

    #[test]
    fn test_volatility_and_annualization() {
        assert_eq!(annualized_volatility(&[0.01]), 0.0);
        assert_eq!(annualized_volatility(&[0.01, 0.01, 0.01]), 0.0);
        let vol = annualized_volatility(&[0.01, -0.01]);
        assert!((vol - 0.01414213562 * 252f64.sqrt()).abs() < 1e-9);

        assert!((annualize_return(0.1, 252) - 0.1).abs() < 1e-12);
        assert!((annualize_return(0.21, 504) - 0.1).abs() < 1e-12);
        assert_eq!(annualize_return(-1.0, 100), 0.0);
        assert_eq!(annualize_return(0.5, 0), 0.0);
    }

    #[test]
    fn test_sortino_sentinels() {
        let calc = MetricsCalculator::new(0.0);
        assert_eq!(calc.sortino_ratio(&[]), Ratio::ZERO);
        assert_eq!(calc.sortino_ratio(&[0.01, 0.02]), Ratio::Unbounded);
        assert!(matches!(calc.sortino_ratio(&[0.01, -0.02]), Ratio::Finite(v) if v < 0.0));
    }

    #[test]
    fn test_calmar() {
        assert_eq!(calmar_ratio(0.2, 0.0), Ratio::Unbounded);
        assert_eq!(calmar_ratio(-0.1, 0.0), Ratio::ZERO);
        assert_eq!(calmar_ratio(0.0, 0.0), Ratio::ZERO);
        assert_eq!(calmar_ratio(0.2, 0.1), Ratio::Finite(2.0));
    }

    #[test]
    fn test_drawdown_periods() {
        // 두 번째 구간(인덱스 5~7)이 최대 낙폭을 포함하고 8에서 회복
        let dds = [0.0, 0.05, 0.02, 0.0, 0.0, 0.03, 0.10, 0.04, 0.0, 0.0];
        assert_eq!(drawdown_periods(&dds), (3, 3));

        // 회복하지 못한 경우 남은 일수
        let dds = [0.0, 0.01, 0.0, 0.02, 0.05, 0.04];
        assert_eq!(drawdown_periods(&dds), (3, 3));

        assert_eq!(drawdown_periods(&[0.0, 0.0]), (0, 0));
    }

    #[test]
    fn test_full_metrics_on_simple_curve() {
        let daily = vec![
            point(2, dec!(100), 0.0, 0.0),
            point(3, dec!(110), 0.1, 0.0),
            point(4, dec!(99), -0.1, 0.1),
            point(5, dec!(121), 121.0 / 99.0 - 1.0, 0.0),
        ];
        let m = MetricsCalculator::default().calculate(&daily, &[]);

        assert!((m.total_return - 0.21).abs() < 1e-12);
        assert!((m.max_drawdown - 0.1).abs() < 1e-12);
        assert_eq!(m.max_drawdown_period, 1);
        assert_eq!(m.recovery_period, 1);
        assert_eq!(m.trading_days, 4);
        assert_eq!(m.final_value, dec!(121));
        assert!(m.volatility > 0.0);
        assert!(m.sharpe_ratio > 0.0);
        assert!(matches!(m.calmar_ratio, Ratio::Finite(c) if c > 0.0));
        assert!(m.summary().contains("21.00%"));
    }
}
