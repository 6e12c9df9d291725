//! 다중 전략 비교 통합 테스트.
//!
//! 1. 동일/반대 수익률 경로의 상관계수 (실제 엔진 실행 포함)
//! 2. 지표별 순위가 항상 1..=N의 순열인지
//! 3. 벤치마크 포함 옵션

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use trader_analytics::backtest::{BacktestRequest, BacktestResult};
use trader_analytics::comparison::{rank_values, BENCHMARK_LABEL};
use trader_analytics::{
    BacktestEngine, ComparisonEngine, ComparisonMetric, ComparisonOptions,
    MultiStrategyBacktestRequest, MultiStrategyRunner, PerformanceMetrics,
};
use trader_core::{Bar, DailyPoint, Position, PriceSeries, Ratio};
use trader_strategy::StrategyConfig;

// ============================================================================
// 헬퍼 함수
// ============================================================================

fn date(day: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(day)
}

/// 일간 수익률 경로와 지표로 결과를 만듭니다.
fn result(strategy_type: &str, returns: &[f64], metrics: PerformanceMetrics) -> BacktestResult {
    let daily = returns
        .iter()
        .enumerate()
        .map(|(i, r)| DailyPoint {
            date: date(i as i64),
            portfolio_value: dec!(100000),
            daily_return: *r,
            cumulative_return: 0.0,
            drawdown: 0.0,
            cash: dec!(100000),
            position: Position::flat(),
        })
        .collect();

    BacktestResult {
        id: format!("{}-result", strategy_type),
        request: BacktestRequest::new(
            "csi300",
            StrategyConfig::new(strategy_type),
            date(0),
            date(returns.len() as i64),
            dec!(100000),
        ),
        trades: Vec::new(),
        daily_returns: daily,
        performance_metrics: metrics,
        created_at: Utc::now(),
        duration_ms: 0,
    }
}

fn metrics(total_return: f64, sharpe_ratio: f64, max_drawdown: f64) -> PerformanceMetrics {
    PerformanceMetrics {
        total_return,
        sharpe_ratio,
        max_drawdown,
        final_value: Decimal::from(100000),
        ..Default::default()
    }
}

const PATH: [f64; 6] = [0.0, 0.01, -0.02, 0.015, 0.005, -0.01];

// ============================================================================
// 상관계수
// ============================================================================

#[test]
fn test_identical_and_mirrored_paths() {
    let mirrored: Vec<f64> = PATH.iter().map(|r| -r).collect();
    let results = vec![
        result("buy_and_hold", &PATH, metrics(0.1, 1.0, 0.05)),
        result("buy_and_hold", &PATH, metrics(0.1, 1.0, 0.05)),
        result("monthly_rotation", &mirrored, metrics(-0.1, -1.0, 0.2)),
    ];

    let comparison = ComparisonEngine::new()
        .compare(&results, None, &ComparisonOptions::default())
        .unwrap();
    let corr = &comparison.correlation_matrix;

    assert!((corr.get(0, 1).unwrap() - 1.0).abs() < 1e-9);
    assert!((corr.get(0, 2).unwrap() + 1.0).abs() < 1e-9);
    assert_eq!(corr.get(2, 0), corr.get(0, 2));
    assert_eq!(corr.get(1, 1), Some(1.0));
}

#[test]
fn test_engine_runs_on_same_series_are_correlated() {
    let bars = (0..60)
        .map(|i| Bar::flat(date(i), Decimal::from(1000 + (i * 7) % 50)))
        .collect();
    let series = PriceSeries::new("csi300", bars);
    let hold = |allocation: f64| {
        StrategyConfig::new("buy_and_hold")
            .with_param("target_allocation", allocation)
            .with_param("rebalance_frequency", "never")
    };
    let request = MultiStrategyBacktestRequest::new(
        "csi300",
        vec![hold(0.9), hold(0.45), hold(0.9)],
        date(0),
        date(59),
        dec!(100000),
    );

    let multi = MultiStrategyRunner::new(BacktestEngine::default())
        .run(&request, &series, None)
        .unwrap();
    assert_eq!(multi.results.len(), 3);
    for result in &multi.results {
        assert_eq!(result.daily_returns.len(), 60);
        assert!(result.daily_returns.last().unwrap().position.is_flat());
    }

    let corr = &multi.comparison.correlation_matrix;
    // 같은 설정은 수익률 경로가 동일
    assert!((corr.get(0, 2).unwrap() - 1.0).abs() < 1e-9);
    // 비중만 다른 보유 전략은 거의 완전 상관
    assert!(corr.get(0, 1).unwrap() > 0.99);
    assert_eq!(corr.get(0, 1), corr.get(1, 0));
}

#[test]
fn test_flat_path_has_zero_correlation() {
    let results = vec![
        result("buy_and_hold", &[0.0; 6], metrics(0.0, 0.0, 0.0)),
        result("monthly_rotation", &PATH, metrics(0.05, 0.5, 0.1)),
    ];
    let comparison = ComparisonEngine::new()
        .compare(&results, None, &ComparisonOptions::default())
        .unwrap();
    assert_eq!(comparison.correlation_matrix.get(0, 1), Some(0.0));
}

// ============================================================================
// 순위 / 최고·최저 전략
// ============================================================================

#[test]
fn test_rankings_and_labels() {
    let results = vec![
        result("buy_and_hold", &PATH, metrics(0.10, 0.8, 0.20)),
        result("monthly_rotation", &PATH, metrics(0.30, 1.5, 0.05)),
        result("buy_and_hold", &PATH, metrics(-0.05, -0.3, 0.35)),
    ];
    let options = ComparisonOptions::default().with_metrics(vec![
        ComparisonMetric::TotalReturn,
        ComparisonMetric::MaxDrawdown,
    ]);
    let comparison = ComparisonEngine::new().compare(&results, None, &options).unwrap();

    assert_eq!(
        comparison.labels,
        vec!["buy_and_hold_1", "monthly_rotation_2", "buy_and_hold_3"]
    );
    assert_eq!(comparison.metrics.len(), 2);
    assert_eq!(comparison.ranks(ComparisonMetric::TotalReturn), Some(&[2, 1, 3][..]));
    assert_eq!(comparison.ranks(ComparisonMetric::MaxDrawdown), Some(&[2, 1, 3][..]));
    assert!(comparison.ranks(ComparisonMetric::SharpeRatio).is_none());
    assert_eq!(
        comparison.values(ComparisonMetric::TotalReturn).unwrap()[1],
        Ratio::Finite(0.30)
    );

    assert_eq!(comparison.best_strategy, "monthly_rotation_2");
    assert_eq!(comparison.worst_strategy, "buy_and_hold_3");
    assert!(comparison.summary.contains("monthly_rotation_2"));
    assert!(comparison.summary.contains("3개 전략"));
}

#[test]
fn test_unbounded_ranks_first() {
    let mut winner = metrics(0.05, 0.5, 0.0);
    winner.profit_factor = Ratio::Unbounded;
    let mut other = metrics(0.2, 1.0, 0.1);
    other.profit_factor = Ratio::Finite(50.0);

    let results = vec![
        result("monthly_rotation", &PATH, other),
        result("buy_and_hold", &PATH, winner),
    ];
    let comparison = ComparisonEngine::new()
        .compare(&results, None, &ComparisonOptions::default())
        .unwrap();
    assert_eq!(comparison.ranks(ComparisonMetric::ProfitFactor), Some(&[2, 1][..]));
}

#[test]
fn test_benchmark_only_when_included() {
    let results = vec![result("monthly_rotation", &PATH, metrics(0.1, 1.0, 0.1))];
    let benchmark = result("buy_and_hold", &PATH, metrics(0.2, 1.2, 0.1));
    let engine = ComparisonEngine::new();

    let without = engine
        .compare(&results, Some(&benchmark), &ComparisonOptions::default())
        .unwrap();
    assert_eq!(without.labels.len(), 1);

    let with = engine
        .compare(
            &results,
            Some(&benchmark),
            &ComparisonOptions::default().with_benchmark(true),
        )
        .unwrap();
    assert_eq!(with.labels.last().map(String::as_str), Some(BENCHMARK_LABEL));
    assert_eq!(with.correlation_matrix.len(), 2);
    assert_eq!(with.best_strategy, BENCHMARK_LABEL);
}

#[test]
fn test_empty_results_rejected() {
    assert!(ComparisonEngine::new()
        .compare(&[], None, &ComparisonOptions::default())
        .is_err());
}

// ============================================================================
// 불변식 (Property-based)
// ============================================================================

fn ratio() -> impl Strategy<Value = Ratio> {
    prop_oneof![
        9 => (-1000i32..1000).prop_map(|v| Ratio::Finite(v as f64 / 100.0)),
        1 => Just(Ratio::Unbounded),
    ]
}

proptest! {
    #[test]
    fn prop_ranks_are_permutation(
        values in prop::collection::vec(ratio(), 1..12),
        lower in any::<bool>(),
    ) {
        let ranks = rank_values(&values, lower);

        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (1..=values.len()).collect::<Vec<_>>());

        // 1위는 방향상 최선 값 중 입력 순서가 가장 앞선 것
        let best = (0..values.len())
            .reduce(|a, b| {
                let ord = values[b].total_cmp(&values[a]);
                let better = if lower { ord.is_lt() } else { ord.is_gt() };
                if better { b } else { a }
            })
            .unwrap();
        prop_assert_eq!(ranks[best], 1);
    }
}
