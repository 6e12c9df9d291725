//! 결정적 합성 가격 Provider.
//!
//! 외부 시세 없이 백테스트를 돌리기 위한 일봉 생성기입니다.
//! 같은 (자산, 시드, 구간)이면 항상 같은 시계열을 생성합니다.
//!
//! - 평일만 생성 (주말 제외)
//! - 일간 수익률 ~ N(0, 2%) 랜덤 워크
//! - 시가 갭 ±0.25%, 장중 변동 0~1%
//! - 가격은 소수점 둘째 자리로 반올림

use super::catalog::{AssetCatalog, AssetInfo};
use super::PriceSeriesProvider;
use crate::error::{DataError, Result};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::debug;
use trader_core::{Bar, PriceSeries};

/// 일간 변동성.
const DAILY_VOLATILITY: f64 = 0.02;
/// 장중 변동폭 상한.
const INTRADAY_RANGE: f64 = 0.01;
/// 시가 갭 폭.
const GAP_RANGE: f64 = 0.005;
/// 기준 거래량.
const BASE_VOLUME: f64 = 100_000_000.0;
/// 최소 가격.
const MIN_PRICE: f64 = 0.01;

/// 자산별 시드로 결정적인 합성 일봉을 생성하는 Provider.
#[derive(Debug, Clone)]
pub struct SyntheticPriceProvider {
    base_seed: u64,
}

impl SyntheticPriceProvider {
    /// 기본 시드로 Provider를 생성합니다.
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// 자산 심볼과 기본 시드로 RNG 시드를 계산합니다.
    fn seed_for(&self, symbol: &str) -> u64 {
        let hash = symbol
            .chars()
            .fold(0i64, |h, c| h.wrapping_mul(31).wrapping_add(c as i64));
        (hash as u64).wrapping_add(self.base_seed)
    }

    /// 구간의 일봉을 생성합니다.
    fn generate(&self, asset: &AssetInfo, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
        let mut rng = StdRng::seed_from_u64(self.seed_for(asset.symbol));
        let mut prev_close = asset.base_price.to_f64().unwrap_or(3000.0);

        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .map(|date| {
                let bar = next_bar(&mut rng, date, prev_close);
                prev_close = bar.close.to_f64().unwrap_or(prev_close);
                bar
            })
            .collect()
    }
}

impl Default for SyntheticPriceProvider {
    fn default() -> Self {
        Self::new(42)
    }
}

/// 표준 정규분포 샘플 (Box–Muller).
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn to_price(value: f64) -> Decimal {
    Decimal::from_f64(value.max(MIN_PRICE))
        .unwrap_or(Decimal::ONE)
        .round_dp(2)
}

/// 전일 종가에서 다음 일봉을 생성합니다.
fn next_bar(rng: &mut StdRng, date: NaiveDate, prev_close: f64) -> Bar {
    let daily_return = standard_normal(rng) * DAILY_VOLATILITY;
    let close = prev_close * (1.0 + daily_return);

    let intraday = rng.gen::<f64>() * INTRADAY_RANGE;
    let gap = (rng.gen::<f64>() - 0.5) * GAP_RANGE;
    let open = prev_close * (1.0 + gap);

    let high = open.max(close) * (1.0 + intraday);
    let low = open.min(close) * (1.0 - intraday);

    let volume = (BASE_VOLUME * (0.5 + rng.gen::<f64>())).floor();

    Bar::new(
        date,
        to_price(open),
        to_price(high),
        to_price(low),
        to_price(close),
        Decimal::from_f64(volume).unwrap_or_default(),
    )
}

#[async_trait]
impl PriceSeriesProvider for SyntheticPriceProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn is_supported(&self, asset_id: &str) -> bool {
        AssetCatalog::find(asset_id).is_some()
    }

    async fn fetch_daily_bars(
        &self,
        asset_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        if start > end {
            return Err(DataError::InvalidRequest(format!(
                "start {} is after end {}",
                start, end
            )));
        }

        let asset = AssetCatalog::find(asset_id)
            .ok_or_else(|| DataError::NotFound(format!("unknown asset: {}", asset_id)))?;

        let bars = self.generate(asset, start, end);
        if bars.is_empty() {
            return Err(DataError::NotFound(format!(
                "no trading days for {} in {}..={}",
                asset_id, start, end
            )));
        }

        debug!(asset_id, symbol = asset.symbol, bars = bars.len(), "Generated synthetic bars");
        Ok(PriceSeries::new(asset.id, bars))
    }
}
