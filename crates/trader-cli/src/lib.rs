//! CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 단일 전략 백테스트 명령
//! - 비교 요청 파일(TOML/JSON) 기반 다중 전략 비교 명령
//! - 지원 전략 카탈로그 출력

pub mod commands;

pub use commands::*;
