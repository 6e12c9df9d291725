//! 메모리 기반 가격 Provider.

use super::PriceSeriesProvider;
use crate::error::{DataError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;
use trader_core::PriceSeries;

/// 미리 적재한 시계열에서 요청 구간을 잘라 반환하는 Provider.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceProvider {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryPriceProvider {
    /// 빈 Provider를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 시계열을 추가한 Provider를 반환합니다.
    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    /// 시계열을 추가합니다. 같은 자산 ID가 있으면 교체합니다.
    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.asset_id().to_string(), series);
    }
}

#[async_trait]
impl PriceSeriesProvider for InMemoryPriceProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_supported(&self, asset_id: &str) -> bool {
        self.series.contains_key(asset_id)
    }

    async fn fetch_daily_bars(
        &self,
        asset_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        if start > end {
            return Err(DataError::InvalidRequest(format!(
                "start {} is after end {}",
                start, end
            )));
        }

        let series = self
            .series
            .get(asset_id)
            .ok_or_else(|| DataError::NotFound(format!("unknown asset: {}", asset_id)))?;

        let window = series.slice(start, end);
        if window.is_empty() {
            return Err(DataError::NotFound(format!(
                "no price data for {} in {}..={}",
                asset_id, start, end
            )));
        }

        debug!(asset_id, bars = window.len(), "Loaded bars from memory");
        Ok(window)
    }
}
