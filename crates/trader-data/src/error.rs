//! 데이터 모듈 오류 타입.

use thiserror::Error;
use trader_core::TraderError;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 자산 또는 구간 데이터를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 잘못된 요청 (빈 자산 ID, 역전된 구간 등)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),
}

/// 데이터 작업을 위한 Result 타입.
pub type Result<T> = std::result::Result<T, DataError>;

impl From<DataError> for TraderError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::InvalidRequest(msg) => TraderError::Validation(msg),
            other => TraderError::Data(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trader_core::ErrorKind;

    #[test]
    fn test_conversion_kind() {
        let err: TraderError = DataError::NotFound("csi300".into()).into();
        assert_eq!(err.kind(), ErrorKind::Data);

        let err: TraderError = DataError::InvalidRequest("empty asset".into()).into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
