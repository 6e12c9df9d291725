//! 분모가 0이 될 수 있는 비율 지표 타입.
//!
//! 소르티노·칼마 비율, 프로핏 팩터는 유리한 방향으로 분모가 0이 되면
//! "상한 없음"이 됩니다. 부동소수 무한대는 직렬화 형식마다 표현이 달라
//! 명시적인 태그 값으로 전달합니다.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// 유한 값 또는 상한 없음(센티널).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Ratio {
    /// 유한한 값
    Finite(f64),
    /// 상한 없음 (분모 0, 유리한 방향)
    Unbounded,
}

impl Default for Ratio {
    fn default() -> Self {
        Ratio::Finite(0.0)
    }
}

impl From<f64> for Ratio {
    fn from(value: f64) -> Self {
        Ratio::Finite(value)
    }
}

impl Ratio {
    /// 0 값.
    pub const ZERO: Ratio = Ratio::Finite(0.0);

    /// 상한 없음 여부.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Ratio::Unbounded)
    }

    /// 전순서 비교. `Unbounded`는 모든 유한 값보다 큽니다.
    pub fn total_cmp(&self, other: &Ratio) -> Ordering {
        match (self, other) {
            (Ratio::Unbounded, Ratio::Unbounded) => Ordering::Equal,
            (Ratio::Unbounded, Ratio::Finite(_)) => Ordering::Greater,
            (Ratio::Finite(_), Ratio::Unbounded) => Ordering::Less,
            (Ratio::Finite(a), Ratio::Finite(b)) => a.total_cmp(b),
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Finite(v) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, v),
                None => write!(f, "{}", v),
            },
            Ratio::Unbounded => write!(f, "∞"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert_eq!(Ratio::Unbounded.total_cmp(&Ratio::Finite(1e9)), Ordering::Greater);
        assert_eq!(Ratio::Finite(-1.0).total_cmp(&Ratio::Finite(2.0)), Ordering::Less);
        assert_eq!(Ratio::Unbounded.total_cmp(&Ratio::Unbounded), Ordering::Equal);
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_string(&Ratio::Unbounded).unwrap();
        assert_eq!(json, r#"{"kind":"unbounded"}"#);

        let json = serde_json::to_string(&Ratio::Finite(1.5)).unwrap();
        assert_eq!(json, r#"{"kind":"finite","value":1.5}"#);

        let back: Ratio = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Ratio::Finite(1.5));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{:.2}", Ratio::Finite(1.2345)), "1.23");
        assert_eq!(format!("{:.2}", Ratio::Unbounded), "∞");
    }
}
