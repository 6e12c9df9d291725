//! 지원 전략 카탈로그.
//!
//! 전략 ID, 설명, 파라미터 명세(타입/기본값/범위/선택지)를 정적으로 관리하고,
//! 파싱된 파라미터로부터 전략 인스턴스를 생성합니다.

use crate::config::{
    BuyAndHoldParams, RebalanceFrequency, StrategyParams, BUY_AND_HOLD, MONTHLY_ROTATION,
};
use crate::strategies::{BuyAndHoldStrategy, MonthlyRotationStrategy};
use crate::Strategy;
use serde::Serialize;

/// 파라미터 값 타입.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Integer,
    Float,
    String,
    Boolean,
}

/// 파라미터 기본값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterDefault {
    Integer(i64),
    Float(f64),
    Text(&'static str),
    Boolean(bool),
}

/// 파라미터 명세.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    pub default: ParameterDefault,
    /// 허용 범위 [min, max]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,
    /// 허용 문자열 값
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [&'static str],
    pub description: &'static str,
}

fn no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

/// 전략 메타데이터.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyMeta {
    /// 전략 ID (snake_case 타입 태그)
    pub id: &'static str,
    /// 전략 이름
    pub name: &'static str,
    /// 전략 설명
    pub description: &'static str,
    /// 파라미터 명세
    pub parameters: &'static [ParameterSpec],
}

static MONTHLY_ROTATION_PARAMS: [ParameterSpec; 2] = [
    ParameterSpec {
        name: "buy_days_before_month_end",
        kind: ParameterKind::Integer,
        default: ParameterDefault::Integer(1),
        range: Some((1.0, 20.0)),
        options: &[],
        description: "월말 몇 거래일 전에 매수할지 (1 = 마지막 거래일)",
    },
    ParameterSpec {
        name: "sell_days_after_month_start",
        kind: ParameterKind::Integer,
        default: ParameterDefault::Integer(1),
        range: Some((1.0, 20.0)),
        options: &[],
        description: "월초 몇 번째 거래일에 매도할지 (1 = 첫 거래일)",
    },
];

static BUY_AND_HOLD_PARAMS: [ParameterSpec; 3] = [
    ParameterSpec {
        name: "target_allocation",
        kind: ParameterKind::Float,
        default: ParameterDefault::Float(1.0),
        range: Some((0.0, 1.0)),
        options: &[],
        description: "목표 투자 비중 (0 초과 1 이하, 1.0 = 100%)",
    },
    ParameterSpec {
        name: "rebalance_frequency",
        kind: ParameterKind::String,
        default: ParameterDefault::Text("never"),
        range: None,
        options: RebalanceFrequency::OPTIONS,
        description: "리밸런싱 주기",
    },
    ParameterSpec {
        name: "dividend_reinvest",
        kind: ParameterKind::Boolean,
        default: ParameterDefault::Boolean(false),
        range: None,
        options: &[],
        description: "배당 재투자 여부 (예약됨, 시뮬레이션에 영향 없음)",
    },
];

static STRATEGIES: [StrategyMeta; 2] = [
    StrategyMeta {
        id: MONTHLY_ROTATION,
        name: "월말 로테이션",
        description: "월말 전에 매수하고 월초 이후에 매도",
        parameters: &MONTHLY_ROTATION_PARAMS,
    },
    StrategyMeta {
        id: BUY_AND_HOLD,
        name: "매수 후 보유",
        description: "최초 매수 후 보유, 선택적 리밸런싱",
        parameters: &BUY_AND_HOLD_PARAMS,
    },
];

/// 전략 카탈로그 조회 API.
pub struct StrategyRegistry;

impl StrategyRegistry {
    /// 모든 지원 전략.
    pub fn all() -> &'static [StrategyMeta] {
        &STRATEGIES
    }

    /// ID로 전략 검색.
    pub fn find(id: &str) -> Option<&'static StrategyMeta> {
        STRATEGIES.iter().find(|meta| meta.id == id)
    }

    /// 지원 여부.
    pub fn is_supported(id: &str) -> bool {
        Self::find(id).is_some()
    }

    /// 전략 ID 목록.
    pub fn list_ids() -> Vec<&'static str> {
        STRATEGIES.iter().map(|meta| meta.id).collect()
    }

    /// 파싱된 파라미터로 새 전략 인스턴스를 생성합니다.
    pub fn create(params: &StrategyParams) -> Box<dyn Strategy> {
        match params {
            StrategyParams::MonthlyRotation(p) => Box::new(MonthlyRotationStrategy::new(*p)),
            StrategyParams::BuyAndHold(p) => Box::new(BuyAndHoldStrategy::new(*p)),
        }
    }

    /// 벤치마크용 매수 후 보유 파라미터 (비중 100%, 리밸런싱 없음).
    pub fn benchmark_params() -> StrategyParams {
        StrategyParams::BuyAndHold(BuyAndHoldParams::default())
    }

    /// 카탈로그 JSON.
    pub fn to_json() -> serde_json::Value {
        serde_json::json!({ "strategies": Self::all() })
    }
}
