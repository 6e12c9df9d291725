//! 가격 데이터 공급과 결과 저장소.
//!
//! 이 crate는 다음을 제공합니다:
//! - 가격 시계열 Provider trait 및 구현 (메모리, 결정적 합성 데이터)
//! - 정적 자산 카탈로그
//! - 백테스트 결과 저장소 (RwLock 캐시)

pub mod cache;
pub mod error;
pub mod provider;

pub use cache::ResultStore;
pub use error::{DataError, Result};
pub use provider::{
    AssetCatalog, AssetInfo, InMemoryPriceProvider, MarketType, PriceSeriesProvider,
    SyntheticPriceProvider,
};
