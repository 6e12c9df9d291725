//! 가격 시계열 Provider 모듈.
//!
//! - `PriceSeriesProvider`: 자산 ID와 닫힌 날짜 구간으로 일봉 시계열을 조회하는 trait
//! - `InMemoryPriceProvider`: 미리 적재한 시계열에서 구간을 잘라 반환
//! - `SyntheticPriceProvider`: 자산별 시드로 결정적인 합성 일봉 생성
//! - `AssetCatalog`: 지원 자산 목록

pub mod catalog;
pub mod memory;
pub mod synthetic;

pub use catalog::{AssetCatalog, AssetInfo, MarketType};
pub use memory::InMemoryPriceProvider;
pub use synthetic::SyntheticPriceProvider;

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use trader_core::PriceSeries;

/// 가격 시계열 Provider trait.
///
/// 구간에 데이터가 하나도 없으면 빈 시계열 대신 `DataError::NotFound`를 반환해야 합니다.
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 지원하는 자산인지 확인합니다.
    fn is_supported(&self, asset_id: &str) -> bool;

    /// 닫힌 구간 [start, end]의 일봉 시계열을 조회합니다.
    async fn fetch_daily_bars(
        &self,
        asset_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries>;
}
