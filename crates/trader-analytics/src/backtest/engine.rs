//! 백테스팅 엔진
//!
//! 일봉 시계열 위에서 전략을 하루씩 실행하고 거래 기록과 일별 자산 곡선을 만듭니다.
//!
//! # 실행 순서
//!
//! 1. `Strategy::on_start`로 전체 구간 사전 계산
//! 2. 일봉마다 `Strategy::on_bar` (마지막 일봉은 이어서 `Strategy::finalize`)
//! 3. 종가로 포지션 평가 후 [`DailyPoint`] 기록
//!
//! 같은 입력이면 거래 기록과 자산 곡선은 항상 같습니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use trader_analytics::backtest::{BacktestConfig, BacktestEngine, BacktestRequest};
//! use trader_strategy::StrategyConfig;
//! use rust_decimal_macros::dec;
//!
//! let engine = BacktestEngine::new(BacktestConfig::default().with_commission_rate(dec!(0.001)));
//! let request = BacktestRequest::new("csi300", StrategyConfig::new("buy_and_hold"), start, end, dec!(100000));
//! let result = engine.run(&request, &series)?;
//!
//! println!("{}", result.performance_metrics.summary());
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};
use trader_core::{
    backtest_span, Amount, BacktestSettings, Bar, DailyPoint, DecimalExt, Portfolio, PriceSeries,
    Trade, TraderError, TraderResult,
};
use trader_strategy::{StrategyConfig, StrategyParams, StrategyRegistry};
use uuid::Uuid;

use crate::performance::{MetricsCalculator, PerformanceMetrics, DEFAULT_RISK_FREE_RATE};

/// 백테스트 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// 거래 수수료율 (예: 0.0003 = 0.03%)
    #[serde(default = "default_commission_rate")]
    pub commission_rate: Decimal,

    /// 무위험 이자율 (연율화 계산용)
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
}

fn default_commission_rate() -> Decimal {
    dec!(0.0003)
}

fn default_risk_free_rate() -> f64 {
    DEFAULT_RISK_FREE_RATE
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            commission_rate: default_commission_rate(),
            risk_free_rate: default_risk_free_rate(),
        }
    }
}

impl From<&BacktestSettings> for BacktestConfig {
    fn from(settings: &BacktestSettings) -> Self {
        Self {
            commission_rate: settings.commission_rate,
            risk_free_rate: settings.risk_free_rate,
        }
    }
}

impl BacktestConfig {
    /// 수수료율 설정
    pub fn with_commission_rate(mut self, rate: Decimal) -> Self {
        self.commission_rate = rate;
        self
    }

    /// 무위험 이자율 설정
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// 설정 유효성 검사
    pub fn validate(&self) -> TraderResult<()> {
        if self.commission_rate < Decimal::ZERO || self.commission_rate >= Decimal::ONE {
            return Err(TraderError::validation(format!(
                "수수료율은 0 이상 1 미만이어야 합니다: {}",
                self.commission_rate
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(TraderError::validation("무위험 이자율이 유효하지 않습니다"));
        }
        Ok(())
    }
}

/// 단일 전략 백테스트 요청.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    /// 대상 자산 ID
    pub asset_id: String,
    /// 전략 설정
    pub strategy: StrategyConfig,
    /// 시작일 (포함)
    pub start_date: NaiveDate,
    /// 종료일 (포함)
    pub end_date: NaiveDate,
    /// 초기 현금
    pub initial_cash: Amount,
    /// 벤치마크 자산 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<String>,
}

impl BacktestRequest {
    pub fn new(
        asset_id: impl Into<String>,
        strategy: StrategyConfig,
        start_date: NaiveDate,
        end_date: NaiveDate,
        initial_cash: Amount,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            strategy,
            start_date,
            end_date,
            initial_cash,
            benchmark: None,
        }
    }

    pub fn with_benchmark(mut self, benchmark: impl Into<String>) -> Self {
        self.benchmark = Some(benchmark.into());
        self
    }

    /// 요청 필드를 검사합니다. 전략 파라미터는 실행 시 파싱 단계에서 검사됩니다.
    pub fn validate(&self) -> TraderResult<()> {
        validate_common(
            &self.asset_id,
            self.start_date,
            self.end_date,
            self.initial_cash,
        )?;
        if self.strategy.strategy_type.trim().is_empty() {
            return Err(TraderError::validation("전략 타입이 비어 있습니다"));
        }
        Ok(())
    }
}

/// 단일/다중 요청이 공유하는 필드 검사.
pub(crate) fn validate_common(
    asset_id: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    initial_cash: Amount,
) -> TraderResult<()> {
    if asset_id.trim().is_empty() {
        return Err(TraderError::validation("자산 ID가 비어 있습니다"));
    }
    if initial_cash <= Decimal::ZERO {
        return Err(TraderError::validation(format!(
            "초기 현금은 0보다 커야 합니다: {}",
            initial_cash
        )));
    }
    if start_date >= end_date {
        return Err(TraderError::validation(format!(
            "시작일({})은 종료일({})보다 앞서야 합니다",
            start_date, end_date
        )));
    }
    Ok(())
}

/// 백테스트 결과. 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// 결과 ID (UUID v4)
    pub id: String,
    /// 요청 원본
    pub request: BacktestRequest,
    /// 체결 기록 (시간순)
    pub trades: Vec<Trade>,
    /// 일별 자산 곡선
    pub daily_returns: Vec<DailyPoint>,
    /// 성과 지표
    pub performance_metrics: PerformanceMetrics,
    pub created_at: DateTime<Utc>,
    /// 실행 시간 (밀리초)
    pub duration_ms: u64,
}

impl BacktestResult {
    /// 요약 문자열 반환
    pub fn summary(&self) -> String {
        let m = &self.performance_metrics;
        format!(
            "백테스트 결과 요약\n\
             ═══════════════════════════════════════\n\
             자산: {}\n\
             전략: {}\n\
             기간: {} ~ {} ({}일)\n\
             ───────────────────────────────────────\n\
             초기 자본: {}\n\
             최종 가치: {}\n\
             총 수익률: {:.2}%\n\
             연율화 수익률: {:.2}%\n\
             ───────────────────────────────────────\n\
             변동성: {:.2}%\n\
             샤프 비율: {:.2}\n\
             소르티노 비율: {:.2}\n\
             칼마 비율: {:.2}\n\
             최대 낙폭: {:.2}% (지속 {}일, 회복 {}일)\n\
             ───────────────────────────────────────\n\
             라운드트립: {} (승 {} / 패 {})\n\
             승률: {:.1}%\n\
             프로핏 팩터: {:.2}\n\
             총 수수료: {}\n\
             ═══════════════════════════════════════",
            self.request.asset_id,
            self.request.strategy.strategy_type,
            self.request.start_date,
            self.request.end_date,
            m.trading_days,
            self.request.initial_cash,
            m.final_value.round_dp(2),
            m.total_return * 100.0,
            m.annualized_return * 100.0,
            m.volatility * 100.0,
            m.sharpe_ratio,
            m.sortino_ratio,
            m.calmar_ratio,
            m.max_drawdown * 100.0,
            m.max_drawdown_period,
            m.recovery_period,
            m.total_trades,
            m.winning_trades,
            m.losing_trades,
            m.win_rate * 100.0,
            m.profit_factor,
            m.total_commission.round_dp(2),
        )
    }
}

/// 시뮬레이션 산출물 (거래 기록 + 일별 자산 곡선).
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub trades: Vec<Trade>,
    pub daily: Vec<DailyPoint>,
}

/// 일별 자산 곡선 기록기.
struct EquityRecorder {
    initial_cash: Amount,
    peak: Option<Amount>,
    prev_value: Option<Amount>,
    points: Vec<DailyPoint>,
}

impl EquityRecorder {
    fn new(initial_cash: Amount, capacity: usize) -> Self {
        Self {
            initial_cash,
            peak: None,
            prev_value: None,
            points: Vec::with_capacity(capacity),
        }
    }

    fn record(&mut self, date: NaiveDate, portfolio: &Portfolio) {
        let value = portfolio.total_value();

        let daily_return = match self.prev_value {
            Some(prev) if prev > Decimal::ZERO => {
                ((value - prev).checked_ratio(prev)).map_or(0.0, |r| r.to_f64_lossy())
            }
            _ => 0.0,
        };
        let cumulative_return = (value - self.initial_cash)
            .checked_ratio(self.initial_cash)
            .map_or(0.0, |r| r.to_f64_lossy());

        let peak = self.peak.map_or(value, |p| p.max(value));
        let drawdown = (peak - value)
            .checked_ratio(peak)
            .map_or(0.0, |r| r.to_f64_lossy())
            .max(0.0);

        self.peak = Some(peak);
        self.prev_value = Some(value);
        self.points.push(DailyPoint {
            date,
            portfolio_value: value,
            daily_return,
            cumulative_return,
            drawdown,
            cash: portfolio.cash(),
            position: portfolio.position().clone(),
        });
    }
}

/// 백테스트 실행 엔진.
///
/// 상태를 갖지 않으며 실행마다 새 전략 인스턴스와 원장을 만듭니다.
#[derive(Debug, Clone, Default)]
pub struct BacktestEngine {
    config: BacktestConfig,
    metrics: MetricsCalculator,
}

impl BacktestEngine {
    /// 새로운 백테스트 엔진을 생성합니다.
    pub fn new(config: BacktestConfig) -> Self {
        let metrics = MetricsCalculator::new(config.risk_free_rate);
        Self { config, metrics }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub fn metrics_calculator(&self) -> &MetricsCalculator {
        &self.metrics
    }

    /// 요청을 검증하고 요청 구간의 일봉으로 백테스트를 실행합니다.
    ///
    /// 실패하면 부분 결과 없이 에러를 반환합니다.
    pub fn run(&self, request: &BacktestRequest, series: &PriceSeries) -> TraderResult<BacktestResult> {
        let started = Instant::now();
        let span = backtest_span!(
            "backtest",
            request.asset_id,
            request.strategy.strategy_type
        );
        let _enter = span.enter();

        self.config.validate()?;
        request.validate()?;
        let params = request.strategy.parse()?;

        let bars = series.window(request.start_date, request.end_date);
        if bars.is_empty() {
            return Err(TraderError::data(format!(
                "{} 구간에 가격 데이터가 없습니다: {} ~ {}",
                request.asset_id, request.start_date, request.end_date
            )));
        }

        let simulation = self.simulate(&params, bars, request.initial_cash)?;
        let metrics = self.metrics.calculate(&simulation.daily, &simulation.trades);

        info!(
            bars = bars.len(),
            trades = simulation.trades.len(),
            total_return = metrics.total_return,
            max_drawdown = metrics.max_drawdown,
            "Backtest completed"
        );

        Ok(BacktestResult {
            id: Uuid::new_v4().to_string(),
            request: request.clone(),
            trades: simulation.trades,
            daily_returns: simulation.daily,
            performance_metrics: metrics,
            created_at: Utc::now(),
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// 파싱된 전략 파라미터로 일봉 시뮬레이션만 수행합니다.
    ///
    /// 일봉은 날짜 오름차순이어야 하며 종가는 양수여야 합니다.
    pub fn simulate(
        &self,
        params: &StrategyParams,
        bars: &[Bar],
        initial_cash: Amount,
    ) -> TraderResult<Simulation> {
        if bars.is_empty() {
            return Err(TraderError::data("가격 데이터가 비어 있습니다"));
        }
        if initial_cash <= Decimal::ZERO {
            return Err(TraderError::validation(format!(
                "초기 현금은 0보다 커야 합니다: {}",
                initial_cash
            )));
        }
        check_bars(bars)?;

        let mut strategy = StrategyRegistry::create(params);
        let mut portfolio = Portfolio::new(initial_cash, self.config.commission_rate);
        let mut recorder = EquityRecorder::new(initial_cash, bars.len());
        let last = bars.len() - 1;

        debug!(strategy = strategy.name(), bars = bars.len(), "Simulation started");
        strategy.on_start(bars);

        for (index, bar) in bars.iter().enumerate() {
            strategy.on_bar(index, bar, &mut portfolio);
            if index == last {
                strategy.finalize(bar, &mut portfolio);
            }
            portfolio.mark_to_market(bar.close);
            recorder.record(bar.date, &portfolio);
        }

        Ok(Simulation {
            trades: portfolio.into_trades(),
            daily: recorder.points,
        })
    }
}

/// 일봉 순서와 종가를 검사합니다.
fn check_bars(bars: &[Bar]) -> TraderResult<()> {
    if let Some(bad) = bars.iter().find(|b| b.close <= Decimal::ZERO) {
        return Err(TraderError::data(format!(
            "{} 종가가 0 이하입니다: {}",
            bad.date, bad.close
        )));
    }
    if bars.windows(2).any(|w| w[0].date >= w[1].date) {
        return Err(TraderError::data(
            "일봉이 날짜 오름차순으로 정렬되어 있지 않습니다",
        ));
    }
    Ok(())
}
