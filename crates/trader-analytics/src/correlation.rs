//! 상관계수 계산 모듈.
//!
//! 전략 간 일간 수익률의 선형 상관관계를 계산합니다.
//! 다중 전략 비교에서 분산 효과를 판단하는 데 사용합니다.
//!
//! # 예시
//!
//! ```rust,ignore
//! use trader_analytics::correlation::calculate_correlation;
//!
//! let a = vec![0.01, -0.02, 0.015, 0.005];
//! let b = vec![0.008, -0.015, 0.012, 0.003];
//! println!("상관계수: {:.4}", calculate_correlation(&a, &b).unwrap_or(0.0));
//! ```

use serde::{Deserialize, Serialize};
use trader_core::DailyPoint;

/// 상관행렬 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// 행/열 레이블
    pub labels: Vec<String>,
    /// 상관계수 행렬 (N×N, -1.0 ~ 1.0, 대각선 1.0)
    pub matrix: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// (i, j) 상관계수.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.matrix.get(i).and_then(|row| row.get(j)).copied()
    }

    /// 레이블로 상관계수를 조회합니다.
    pub fn between(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.get(i, j)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Pearson 상관계수.
///
/// 길이가 다르거나 2개 미만이거나 어느 한쪽 분산이 0이면 `None`.
pub fn calculate_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (cov, var_x, var_y) = x.iter().zip(y).fold((0.0, 0.0, 0.0), |(c, vx, vy), (a, b)| {
        let dx = a - mean_x;
        let dy = b - mean_y;
        (c + dx * dy, vx + dx * dx, vy + dy * dy)
    });

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// 자산 곡선에서 일간 수익률 벡터를 추출합니다.
pub fn daily_returns(daily: &[DailyPoint]) -> Vec<f64> {
    daily.iter().map(|p| p.daily_return).collect()
}

/// 수익률 시계열 목록으로 대칭 상관행렬을 만듭니다.
///
/// 계산할 수 없는 쌍은 0.0으로 채웁니다.
pub fn correlation_matrix(labels: Vec<String>, series: &[Vec<f64>]) -> CorrelationMatrix {
    let n = series.len();
    let mut matrix = vec![vec![0.0; n]; n];

    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let corr = calculate_correlation(&series[i], &series[j]).unwrap_or(0.0);
            matrix[i][j] = corr;
            matrix[j][i] = corr;
        }
    }

    CorrelationMatrix { labels, matrix }
}
