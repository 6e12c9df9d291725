//! # Trader Core
//!
//! 전략 백테스트 시스템의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 일봉 데이터 및 가격 시계열
//! - 포지션 / 거래 기록 / 일별 자산 스냅샷
//! - 현금·포지션 원장 (`Portfolio`)
//! - 비율 지표의 "무한대" 센티널 (`Ratio`)
//! - 에러 분류
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
