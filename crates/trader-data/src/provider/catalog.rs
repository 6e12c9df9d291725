//! 정적 자산 카탈로그.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// 시장 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    /// 중국 A주 지수
    AShareIndex,
}

/// 자산 정보.
#[derive(Debug, Clone, Serialize)]
pub struct AssetInfo {
    /// 자산 ID (요청에서 사용)
    pub id: &'static str,
    /// 거래소 심볼
    pub symbol: &'static str,
    /// 자산 이름
    pub name: &'static str,
    pub market_type: MarketType,
    /// 합성 데이터 생성 시 시작 가격
    pub base_price: Decimal,
}

/// 기본 시작 가격 (카탈로그에 없는 심볼).
pub const DEFAULT_BASE_PRICE: Decimal = dec!(3000);

static ASSETS: [AssetInfo; 7] = [
    AssetInfo {
        id: "csi300",
        symbol: "000300.SH",
        name: "CSI 300",
        market_type: MarketType::AShareIndex,
        base_price: dec!(4200),
    },
    AssetInfo {
        id: "sse50",
        symbol: "000016.SH",
        name: "SSE 50",
        market_type: MarketType::AShareIndex,
        base_price: dec!(3100),
    },
    AssetInfo {
        id: "csi500",
        symbol: "000905.SH",
        name: "CSI 500",
        market_type: MarketType::AShareIndex,
        base_price: dec!(6800),
    },
    AssetInfo {
        id: "csi1000",
        symbol: "000852.SH",
        name: "CSI 1000",
        market_type: MarketType::AShareIndex,
        base_price: dec!(6500),
    },
    AssetInfo {
        id: "star50",
        symbol: "000688.SH",
        name: "STAR 50",
        market_type: MarketType::AShareIndex,
        base_price: dec!(1200),
    },
    AssetInfo {
        id: "chinext",
        symbol: "399006.SZ",
        name: "ChiNext",
        market_type: MarketType::AShareIndex,
        base_price: dec!(2400),
    },
    AssetInfo {
        id: "szse100",
        symbol: "399330.SZ",
        name: "SZSE 100",
        market_type: MarketType::AShareIndex,
        base_price: dec!(5200),
    },
];

/// 자산 카탈로그 조회 API.
pub struct AssetCatalog;

impl AssetCatalog {
    /// 전체 자산.
    pub fn all() -> &'static [AssetInfo] {
        &ASSETS
    }

    /// 자산 ID 또는 심볼로 검색합니다.
    pub fn find(query: &str) -> Option<&'static AssetInfo> {
        ASSETS.iter().find(|a| a.id == query || a.symbol == query)
    }

    /// 시장별 자산.
    pub fn by_market(market_type: MarketType) -> impl Iterator<Item = &'static AssetInfo> {
        ASSETS.iter().filter(move |a| a.market_type == market_type)
    }
}
