//! 캐싱 레이어.
//!
//! - Result 저장소: 완료된 백테스트 결과를 ID로 보관 (프로세스 메모리)

pub mod result_store;

pub use result_store::ResultStore;
