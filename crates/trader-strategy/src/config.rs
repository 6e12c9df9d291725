//! 전략 설정과 파라미터 파싱.
//!
//! 요청에는 전략 타입 태그와 자유 형식 key/value 파라미터 맵이 들어옵니다.
//! 시뮬레이션 전에 `StrategyConfig::parse`로 타입이 있는 `StrategyParams`로
//! 변환하며, 이 단계에서 알 수 없는 키, 잘못된 타입, 범위를 벗어난 값을 거부합니다.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use trader_core::{TraderError, TraderResult};

/// 월말 로테이션 전략 타입 태그.
pub const MONTHLY_ROTATION: &str = "monthly_rotation";
/// 매수 후 보유 전략 타입 태그.
pub const BUY_AND_HOLD: &str = "buy_and_hold";

/// 요청에 담긴 전략 설정.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// 전략 타입 태그
    #[serde(rename = "type")]
    pub strategy_type: String,
    /// 전략 파라미터
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// 설명
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl StrategyConfig {
    /// 파라미터 없는 설정을 생성합니다.
    pub fn new(strategy_type: impl Into<String>) -> Self {
        Self {
            strategy_type: strategy_type.into(),
            parameters: Map::new(),
            description: String::new(),
        }
    }

    /// 파라미터를 추가합니다.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// 설명을 설정합니다.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 타입이 있는 파라미터를 설정 형태로 되돌립니다.
    pub fn from_params(params: &StrategyParams) -> Self {
        let mut parameters = match serde_json::to_value(params) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        parameters.remove("type");
        Self {
            strategy_type: params.strategy_type().to_string(),
            parameters,
            description: String::new(),
        }
    }

    /// 파라미터 맵을 검증하고 타입이 있는 파라미터로 변환합니다.
    pub fn parse(&self) -> TraderResult<StrategyParams> {
        match self.strategy_type.as_str() {
            "" => Err(TraderError::validation("전략 타입이 비어 있습니다")),
            MONTHLY_ROTATION => {
                MonthlyRotationParams::from_map(&self.parameters).map(StrategyParams::MonthlyRotation)
            }
            BUY_AND_HOLD => {
                BuyAndHoldParams::from_map(&self.parameters).map(StrategyParams::BuyAndHold)
            }
            other => Err(TraderError::validation(format!(
                "지원하지 않는 전략 타입: {}",
                other
            ))),
        }
    }
}

/// 전략별 타입이 있는 파라미터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyParams {
    MonthlyRotation(MonthlyRotationParams),
    BuyAndHold(BuyAndHoldParams),
}

impl StrategyParams {
    /// 전략 타입 태그.
    pub fn strategy_type(&self) -> &'static str {
        match self {
            StrategyParams::MonthlyRotation(_) => MONTHLY_ROTATION,
            StrategyParams::BuyAndHold(_) => BUY_AND_HOLD,
        }
    }
}

/// 월말 로테이션 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRotationParams {
    /// 월말 몇 번째 거래일 전에 매수할지 (1 = 마지막 거래일)
    pub buy_days_before_month_end: u32,
    /// 월초 몇 번째 거래일에 매도할지 (1 = 첫 거래일)
    pub sell_days_after_month_start: u32,
}

impl MonthlyRotationParams {
    /// 허용 범위 최솟값.
    pub const MIN_DAYS: i64 = 1;
    /// 허용 범위 최댓값.
    pub const MAX_DAYS: i64 = 20;

    fn from_map(map: &Map<String, Value>) -> TraderResult<Self> {
        reject_unknown_keys(
            MONTHLY_ROTATION,
            map,
            &["buy_days_before_month_end", "sell_days_after_month_start"],
        )?;

        let mut params = Self::default();
        if let Some(days) = read_integer(map, "buy_days_before_month_end")? {
            params.buy_days_before_month_end = Self::check_days("buy_days_before_month_end", days)?;
        }
        if let Some(days) = read_integer(map, "sell_days_after_month_start")? {
            params.sell_days_after_month_start =
                Self::check_days("sell_days_after_month_start", days)?;
        }
        Ok(params)
    }

    fn check_days(key: &str, days: i64) -> TraderResult<u32> {
        if !(Self::MIN_DAYS..=Self::MAX_DAYS).contains(&days) {
            return Err(TraderError::validation(format!(
                "{}는 [{}, {}] 범위여야 합니다: {}",
                key,
                Self::MIN_DAYS,
                Self::MAX_DAYS,
                days
            )));
        }
        Ok(days as u32)
    }
}

impl Default for MonthlyRotationParams {
    fn default() -> Self {
        Self {
            buy_days_before_month_end: 1,
            sell_days_after_month_start: 1,
        }
    }
}

/// 리밸런싱 주기.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceFrequency {
    #[default]
    Never,
    Monthly,
    Quarterly,
    Yearly,
}

impl RebalanceFrequency {
    /// 허용되는 문자열 값.
    pub const OPTIONS: &'static [&'static str] = &["never", "monthly", "quarterly", "yearly"];
}

impl FromStr for RebalanceFrequency {
    type Err = TraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(Self::Never),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            other => Err(TraderError::validation(format!(
                "rebalance_frequency는 {:?} 중 하나여야 합니다: {}",
                Self::OPTIONS,
                other
            ))),
        }
    }
}

impl fmt::Display for RebalanceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Never => "never",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        };
        write!(f, "{}", s)
    }
}

/// 매수 후 보유 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyAndHoldParams {
    /// 목표 투자 비중 (0, 1]
    pub target_allocation: f64,
    /// 리밸런싱 주기
    pub rebalance_frequency: RebalanceFrequency,
    /// 배당 재투자 (예약됨, 시뮬레이션에 영향 없음)
    pub dividend_reinvest: bool,
}

impl BuyAndHoldParams {
    fn from_map(map: &Map<String, Value>) -> TraderResult<Self> {
        reject_unknown_keys(
            BUY_AND_HOLD,
            map,
            &["target_allocation", "rebalance_frequency", "dividend_reinvest"],
        )?;

        let mut params = Self::default();
        if let Some(allocation) = read_float(map, "target_allocation")? {
            if !(allocation > 0.0 && allocation <= 1.0) {
                return Err(TraderError::validation(format!(
                    "target_allocation은 (0, 1] 범위여야 합니다: {}",
                    allocation
                )));
            }
            params.target_allocation = allocation;
        }
        if let Some(freq) = read_string(map, "rebalance_frequency")? {
            params.rebalance_frequency = freq.parse()?;
        }
        if let Some(reinvest) = read_bool(map, "dividend_reinvest")? {
            params.dividend_reinvest = reinvest;
        }
        Ok(params)
    }
}

impl Default for BuyAndHoldParams {
    fn default() -> Self {
        Self {
            target_allocation: 1.0,
            rebalance_frequency: RebalanceFrequency::Never,
            dividend_reinvest: false,
        }
    }
}

// ============================================================================
// 파라미터 맵 헬퍼
// ============================================================================

fn reject_unknown_keys(
    strategy_type: &str,
    map: &Map<String, Value>,
    allowed: &[&str],
) -> TraderResult<()> {
    match map.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(TraderError::validation(format!(
            "{} 전략에 알 수 없는 파라미터: {}",
            strategy_type, key
        ))),
        None => Ok(()),
    }
}

/// 값이 없거나 null이면 `None`.
fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn wrong_type(key: &str, expected: &str, value: &Value) -> TraderError {
    TraderError::validation(format!("{}는 {} 타입이어야 합니다: {}", key, expected, value))
}

/// 정수 파라미터. JSON 숫자가 소수부 없는 실수여도 정수로 받아들입니다.
fn read_integer(map: &Map<String, Value>, key: &str) -> TraderResult<Option<i64>> {
    let Some(value) = present(map, key) else {
        return Ok(None);
    };
    if let Some(i) = value.as_i64() {
        return Ok(Some(i));
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
        _ => Err(wrong_type(key, "integer", value)),
    }
}

fn read_float(map: &Map<String, Value>, key: &str) -> TraderResult<Option<f64>> {
    let Some(value) = present(map, key) else {
        return Ok(None);
    };
    value
        .as_f64()
        .map(Some)
        .ok_or_else(|| wrong_type(key, "float", value))
}

fn read_string<'a>(map: &'a Map<String, Value>, key: &str) -> TraderResult<Option<&'a str>> {
    let Some(value) = present(map, key) else {
        return Ok(None);
    };
    value
        .as_str()
        .map(Some)
        .ok_or_else(|| wrong_type(key, "string", value))
}

fn read_bool(map: &Map<String, Value>, key: &str) -> TraderResult<Option<bool>> {
    let Some(value) = present(map, key) else {
        return Ok(None);
    };
    value
        .as_bool()
        .map(Some)
        .ok_or_else(|| wrong_type(key, "boolean", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trader_core::ErrorKind;

    #[test]
    fn test_defaults_when_empty() {
        let params = StrategyConfig::new("monthly_rotation").parse().unwrap();
        assert_eq!(
            params,
            StrategyParams::MonthlyRotation(MonthlyRotationParams::default())
        );

        let params = StrategyConfig::new("buy_and_hold").parse().unwrap();
        assert_eq!(params, StrategyParams::BuyAndHold(BuyAndHoldParams::default()));
    }

    #[test]
    fn test_monthly_rotation_params() {
        let params = StrategyConfig::new("monthly_rotation")
            .with_param("buy_days_before_month_end", 3)
            .with_param("sell_days_after_month_start", 2.0)
            .parse()
            .unwrap();

        assert_eq!(
            params,
            StrategyParams::MonthlyRotation(MonthlyRotationParams {
                buy_days_before_month_end: 3,
                sell_days_after_month_start: 2,
            })
        );
    }

    #[test]
    fn test_out_of_range_and_wrong_type() {
        let err = StrategyConfig::new("monthly_rotation")
            .with_param("buy_days_before_month_end", 21)
            .parse()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = StrategyConfig::new("monthly_rotation")
            .with_param("sell_days_after_month_start", "1")
            .parse()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        assert!(StrategyConfig::new("monthly_rotation")
            .with_param("buy_days_before_month_end", 1.5)
            .parse()
            .is_err());

        assert!(StrategyConfig::new("buy_and_hold")
            .with_param("target_allocation", 0.0)
            .parse()
            .is_err());

        assert!(StrategyConfig::new("buy_and_hold")
            .with_param("rebalance_frequency", "weekly")
            .parse()
            .is_err());

        assert!(StrategyConfig::new("buy_and_hold")
            .with_param("dividend_reinvest", "yes")
            .parse()
            .is_err());
    }

    #[test]
    fn test_unknown_key_and_type_rejected() {
        let err = StrategyConfig::new("buy_and_hold")
            .with_param("leverage", 2)
            .parse()
            .unwrap_err();
        assert!(err.to_string().contains("leverage"));

        assert!(StrategyConfig::new("grid").parse().is_err());
        assert!(StrategyConfig::new("").parse().is_err());
    }

    #[test]
    fn test_from_params_parses_back() {
        let params = StrategyParams::BuyAndHold(BuyAndHoldParams {
            target_allocation: 0.6,
            rebalance_frequency: RebalanceFrequency::Quarterly,
            dividend_reinvest: false,
        });
        let config = StrategyConfig::from_params(&params);
        assert_eq!(config.strategy_type, BUY_AND_HOLD);
        assert!(!config.parameters.contains_key("type"));
        assert_eq!(config.parse().unwrap(), params);
    }

    #[test]
    fn test_null_value_uses_default() {
        let params = StrategyConfig::new("buy_and_hold")
            .with_param("target_allocation", Value::Null)
            .parse()
            .unwrap();
        assert_eq!(params, StrategyParams::BuyAndHold(BuyAndHoldParams::default()));
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: StrategyConfig = serde_json::from_value(json!({
            "type": "buy_and_hold",
            "parameters": {
                "target_allocation": 0.6,
                "rebalance_frequency": "quarterly",
                "dividend_reinvest": true
            }
        }))
        .unwrap();

        let params = config.parse().unwrap();
        assert_eq!(params.strategy_type(), "buy_and_hold");
        assert_eq!(
            params,
            StrategyParams::BuyAndHold(BuyAndHoldParams {
                target_allocation: 0.6,
                rebalance_frequency: RebalanceFrequency::Quarterly,
                dividend_reinvest: true,
            })
        );
    }
}
