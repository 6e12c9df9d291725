//! 다중 전략 비교.
//!
//! 같은 자산·구간·초기 자본으로 실행한 여러 백테스트 결과를 지표별로 순위를 매기고,
//! 일간 수익률 상관행렬과 종합 점수로 최고/최저 전략을 고릅니다.
//!
//! # 종합 점수
//!
//! `0.4 × 총 수익률 + 0.4 × 샤프 비율 + 0.2 × (1 − 최대 낙폭)`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use trader_core::{Ratio, TraderError, TraderResult};

use crate::backtest::BacktestResult;
use crate::correlation::{correlation_matrix, daily_returns, CorrelationMatrix};
use crate::performance::PerformanceMetrics;

/// 벤치마크 레이블.
pub const BENCHMARK_LABEL: &str = "benchmark";

const SCORE_RETURN_WEIGHT: f64 = 0.4;
const SCORE_SHARPE_WEIGHT: f64 = 0.4;
const SCORE_DRAWDOWN_WEIGHT: f64 = 0.2;

/// 비교 가능한 지표.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMetric {
    TotalReturn,
    AnnualizedReturn,
    SharpeRatio,
    SortinoRatio,
    MaxDrawdown,
    Volatility,
    WinRate,
    ProfitFactor,
    CalmarRatio,
}

impl ComparisonMetric {
    /// 기본 비교 지표 (순서 유지).
    pub const ALL: [ComparisonMetric; 9] = [
        ComparisonMetric::TotalReturn,
        ComparisonMetric::AnnualizedReturn,
        ComparisonMetric::SharpeRatio,
        ComparisonMetric::SortinoRatio,
        ComparisonMetric::MaxDrawdown,
        ComparisonMetric::Volatility,
        ComparisonMetric::WinRate,
        ComparisonMetric::ProfitFactor,
        ComparisonMetric::CalmarRatio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMetric::TotalReturn => "total_return",
            ComparisonMetric::AnnualizedReturn => "annualized_return",
            ComparisonMetric::SharpeRatio => "sharpe_ratio",
            ComparisonMetric::SortinoRatio => "sortino_ratio",
            ComparisonMetric::MaxDrawdown => "max_drawdown",
            ComparisonMetric::Volatility => "volatility",
            ComparisonMetric::WinRate => "win_rate",
            ComparisonMetric::ProfitFactor => "profit_factor",
            ComparisonMetric::CalmarRatio => "calmar_ratio",
        }
    }

    /// 낮을수록 좋은 지표인지 여부.
    pub fn lower_is_better(&self) -> bool {
        matches!(self, ComparisonMetric::MaxDrawdown | ComparisonMetric::Volatility)
    }

    /// 성과 지표에서 값을 꺼냅니다.
    pub fn extract(&self, metrics: &PerformanceMetrics) -> Ratio {
        match self {
            ComparisonMetric::TotalReturn => Ratio::Finite(metrics.total_return),
            ComparisonMetric::AnnualizedReturn => Ratio::Finite(metrics.annualized_return),
            ComparisonMetric::SharpeRatio => Ratio::Finite(metrics.sharpe_ratio),
            ComparisonMetric::SortinoRatio => metrics.sortino_ratio,
            ComparisonMetric::MaxDrawdown => Ratio::Finite(metrics.max_drawdown),
            ComparisonMetric::Volatility => Ratio::Finite(metrics.volatility),
            ComparisonMetric::WinRate => Ratio::Finite(metrics.win_rate),
            ComparisonMetric::ProfitFactor => metrics.profit_factor,
            ComparisonMetric::CalmarRatio => metrics.calmar_ratio,
        }
    }
}

impl fmt::Display for ComparisonMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonMetric {
    type Err = TraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComparisonMetric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| TraderError::validation(format!("알 수 없는 비교 지표: {}", s)))
    }
}

/// 비교 옵션.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOptions {
    /// 비교할 지표 (순서 유지)
    #[serde(default = "default_metrics")]
    pub metrics: Vec<ComparisonMetric>,
    /// 벤치마크를 비교 대상에 포함할지 여부 (마지막에 추가)
    #[serde(default)]
    pub include_benchmark: bool,
}

fn default_metrics() -> Vec<ComparisonMetric> {
    ComparisonMetric::ALL.to_vec()
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            metrics: default_metrics(),
            include_benchmark: false,
        }
    }
}

impl ComparisonOptions {
    pub fn with_metrics(mut self, metrics: Vec<ComparisonMetric>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_benchmark(mut self, include: bool) -> Self {
        self.include_benchmark = include;
        self
    }

    /// 지표 이름 목록으로 옵션을 만듭니다.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> TraderResult<Self> {
        let metrics = names
            .iter()
            .map(|n| n.as_ref().parse())
            .collect::<TraderResult<Vec<_>>>()?;
        Ok(Self::default().with_metrics(metrics))
    }

    pub fn validate(&self) -> TraderResult<()> {
        if self.metrics.is_empty() {
            return Err(TraderError::validation("비교 지표가 비어 있습니다"));
        }
        Ok(())
    }
}

/// 지표 하나의 전략별 값과 순위.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: ComparisonMetric,
    /// 전략 순서대로 정렬된 값
    pub values: Vec<Ratio>,
    /// 전략 순서대로 정렬된 순위 (1 = 최고)
    pub ranks: Vec<usize>,
}

/// 다중 전략 비교 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    /// 전략 레이블 (`<전략 타입>_<1부터 시작하는 순번>`, 벤치마크는 `benchmark`)
    pub labels: Vec<String>,
    pub metrics: Vec<MetricComparison>,
    pub correlation_matrix: CorrelationMatrix,
    /// 전략별 종합 점수
    pub scores: Vec<f64>,
    pub best_strategy: String,
    pub worst_strategy: String,
    pub summary: String,
}

impl StrategyComparison {
    pub fn metric(&self, metric: ComparisonMetric) -> Option<&MetricComparison> {
        self.metrics.iter().find(|m| m.metric == metric)
    }

    /// 지표 값 배열.
    pub fn values(&self, metric: ComparisonMetric) -> Option<&[Ratio]> {
        self.metric(metric).map(|m| m.values.as_slice())
    }

    /// 지표 순위 배열.
    pub fn ranks(&self, metric: ComparisonMetric) -> Option<&[usize]> {
        self.metric(metric).map(|m| m.ranks.as_slice())
    }
}

/// 값 배열의 순위를 계산합니다.
///
/// 상한 없음은 모든 유한 값보다 큰 것으로 취급하고, 동점은 입력 순서가 앞선 쪽이
/// 높은 순위를 받습니다. 결과는 항상 1..=N의 순열입니다.
pub fn rank_values(values: &[Ratio], lower_is_better: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        let ord = values[a].total_cmp(&values[b]);
        if lower_is_better {
            ord
        } else {
            ord.reverse()
        }
    });

    let mut ranks = vec![0; values.len()];
    for (position, index) in order.into_iter().enumerate() {
        ranks[index] = position + 1;
    }
    ranks
}

/// 종합 점수.
pub fn overall_score(metrics: &PerformanceMetrics) -> f64 {
    SCORE_RETURN_WEIGHT * metrics.total_return
        + SCORE_SHARPE_WEIGHT * metrics.sharpe_ratio
        + SCORE_DRAWDOWN_WEIGHT * (1.0 - metrics.max_drawdown)
}

/// 전략 레이블.
pub fn strategy_label(strategy_type: &str, index: usize) -> String {
    format!("{}_{}", strategy_type, index + 1)
}

/// 다중 전략 비교 엔진.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonEngine;

impl ComparisonEngine {
    pub fn new() -> Self {
        Self
    }

    /// 결과 목록을 비교합니다.
    ///
    /// 벤치마크는 `include_benchmark`가 설정된 경우에만 마지막 참가자로 포함됩니다.
    pub fn compare(
        &self,
        results: &[BacktestResult],
        benchmark: Option<&BacktestResult>,
        options: &ComparisonOptions,
    ) -> TraderResult<StrategyComparison> {
        if results.is_empty() {
            return Err(TraderError::validation("비교할 전략 결과가 없습니다"));
        }
        options.validate()?;

        let mut labels: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(i, r)| strategy_label(&r.request.strategy.strategy_type, i))
            .collect();
        let mut participants: Vec<&BacktestResult> = results.iter().collect();

        if options.include_benchmark {
            if let Some(benchmark) = benchmark {
                labels.push(BENCHMARK_LABEL.to_string());
                participants.push(benchmark);
            }
        }

        let metrics = options
            .metrics
            .iter()
            .map(|&metric| {
                let values: Vec<Ratio> = participants
                    .iter()
                    .map(|r| metric.extract(&r.performance_metrics))
                    .collect();
                let ranks = rank_values(&values, metric.lower_is_better());
                MetricComparison {
                    metric,
                    values,
                    ranks,
                }
            })
            .collect();

        let series: Vec<Vec<f64>> = participants
            .iter()
            .map(|r| daily_returns(&r.daily_returns))
            .collect();
        let correlation_matrix = correlation_matrix(labels.clone(), &series);

        let scores: Vec<f64> = participants
            .iter()
            .map(|r| overall_score(&r.performance_metrics))
            .collect();
        let (best, worst) = best_and_worst(&scores);

        let performance: Vec<&PerformanceMetrics> =
            participants.iter().map(|r| &r.performance_metrics).collect();
        let summary = build_summary(&labels[best], &labels[worst], &performance);

        debug!(
            participants = participants.len(),
            best = %labels[best],
            worst = %labels[worst],
            "Strategy comparison built"
        );

        Ok(StrategyComparison {
            best_strategy: labels[best].clone(),
            worst_strategy: labels[worst].clone(),
            labels,
            metrics,
            correlation_matrix,
            scores,
            summary,
        })
    }
}

/// (최고, 최저) 점수의 인덱스. 동점이면 앞선 쪽.
fn best_and_worst(scores: &[f64]) -> (usize, usize) {
    let mut best = 0;
    let mut worst = 0;
    for (i, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = i;
        }
        if *score < scores[worst] {
            worst = i;
        }
    }
    (best, worst)
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn build_summary(best: &str, worst: &str, metrics: &[&PerformanceMetrics]) -> String {
    let returns: Vec<f64> = metrics.iter().map(|m| m.total_return).collect();
    let sharpes: Vec<f64> = metrics.iter().map(|m| m.sharpe_ratio).collect();
    let drawdowns: Vec<f64> = metrics.iter().map(|m| m.max_drawdown).collect();

    let min_return = returns.iter().copied().fold(f64::INFINITY, f64::min);
    let max_return = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    format!(
        "전략 비교 요약 ({}개 전략)\n\
         최고 전략: {}\n\
         최저 전략: {}\n\
         수익률: 평균 {:.2}%, 범위 {:.2}% ~ {:.2}%\n\
         평균 샤프 비율: {:.3}\n\
         평균 최대 낙폭: {:.2}%",
        metrics.len(),
        best,
        worst,
        average(&returns) * 100.0,
        min_return * 100.0,
        max_return * 100.0,
        average(&sharpes),
        average(&drawdowns) * 100.0,
    )
}
