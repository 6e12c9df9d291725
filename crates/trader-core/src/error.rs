//! 백테스트 시스템의 에러 타입.
//!
//! 모든 에러는 동기적으로 호출자에게 반환되며, 코어는 재시도하지 않습니다.

use thiserror::Error;

/// 에러 분류.
///
/// API 계층이 사용자에게 노출할 에러 종류를 결정할 때 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 잘못된 요청 또는 전략 파라미터
    Validation,
    /// 가격 데이터 부재 또는 손상
    Data,
    /// 내부 불변식 위반
    Computation,
}

/// 핵심 백테스트 에러.
#[derive(Debug, Error)]
pub enum TraderError {
    /// 요청/파라미터 검증 실패
    #[error("검증 에러: {0}")]
    Validation(String),

    /// 가격 데이터 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 내부 계산 에러 (검증된 입력에서는 발생하지 않아야 함)
    #[error("계산 에러: {0}")]
    Computation(String),

    /// 다중 전략 비교 중 개별 전략 실행 실패
    #[error("전략 실행 실패 (index={index}, type={strategy_type}): {source}")]
    StrategyFailed {
        /// 요청 내 전략 위치 (0부터 시작)
        index: usize,
        /// 전략 타입 태그
        strategy_type: String,
        /// 원인 에러
        #[source]
        source: Box<TraderError>,
    },
}

/// 백테스트 작업을 위한 Result 타입.
pub type TraderResult<T> = Result<T, TraderError>;

impl TraderError {
    /// 검증 에러를 생성합니다.
    pub fn validation(msg: impl Into<String>) -> Self {
        TraderError::Validation(msg.into())
    }

    /// 데이터 에러를 생성합니다.
    pub fn data(msg: impl Into<String>) -> Self {
        TraderError::Data(msg.into())
    }

    /// 개별 전략 실패를 감쌉니다.
    pub fn strategy_failed(index: usize, strategy_type: impl Into<String>, source: TraderError) -> Self {
        TraderError::StrategyFailed {
            index,
            strategy_type: strategy_type.into(),
            source: Box::new(source),
        }
    }

    /// 에러 분류를 반환합니다.
    ///
    /// `StrategyFailed`는 원인 에러의 분류를 따릅니다.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TraderError::Validation(_) => ErrorKind::Validation,
            TraderError::Data(_) => ErrorKind::Data,
            TraderError::Computation(_) => ErrorKind::Computation,
            TraderError::StrategyFailed { source, .. } => source.kind(),
        }
    }

    /// 실패한 전략의 (index, type)을 반환합니다.
    pub fn failed_strategy(&self) -> Option<(usize, &str)> {
        match self {
            TraderError::StrategyFailed {
                index,
                strategy_type,
                ..
            } => Some((*index, strategy_type.as_str())),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TraderError {
    fn from(err: serde_json::Error) -> Self {
        TraderError::Validation(err.to_string())
    }
}
