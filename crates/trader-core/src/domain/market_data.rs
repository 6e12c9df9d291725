//! 일봉 데이터 및 가격 시계열.
//!
//! - `Bar` - 하루치 OHLCV 데이터
//! - `PriceSeries` - 날짜순 정렬·중복 제거된 일봉 시계열

use crate::types::{Price, Quantity};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 일봉 OHLCV 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량
    pub volume: Quantity,
    /// 거래대금
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// 회전율
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turnover: Option<Decimal>,
    /// 등락률 (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pct_change: Option<Decimal>,
}

impl Bar {
    /// 새 일봉을 생성합니다.
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            amount: None,
            turnover: None,
            pct_change: None,
        }
    }

    /// 시가=고가=저가=종가인 일봉을 생성합니다 (테스트·합성 데이터용).
    pub fn flat(date: NaiveDate, price: Price) -> Self {
        Self::new(date, price, price, price, price, Decimal::ZERO)
    }

    /// (연도, 월) 키.
    pub fn year_month(&self) -> (i32, u32) {
        (self.date.year(), self.date.month())
    }
}

/// 날짜순으로 정렬되고 중복 날짜가 제거된 일봉 시계열.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    asset_id: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// 시계열을 생성합니다.
    ///
    /// 날짜순으로 정렬하고, 같은 날짜가 여러 번 나오면 첫 번째 일봉만 남깁니다.
    pub fn new(asset_id: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            asset_id: asset_id.into(),
            bars,
        }
    }

    /// 자산 ID.
    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    /// 전체 일봉.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// 일봉 수.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 첫 거래일.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    /// 마지막 거래일.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// 닫힌 구간 [start, end]에 속한 일봉.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> &[Bar] {
        if start > end {
            return &[];
        }
        let lo = self.bars.partition_point(|b| b.date < start);
        let hi = self.bars.partition_point(|b| b.date <= end);
        &self.bars[lo..hi]
    }

    /// 닫힌 구간으로 잘라낸 새 시계열.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        PriceSeries {
            asset_id: self.asset_id.clone(),
            bars: self.window(start, end).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_series_sorted_and_deduplicated() {
        let series = PriceSeries::new(
            "TEST",
            vec![
                Bar::flat(date(2024, 1, 3), dec!(3)),
                Bar::flat(date(2024, 1, 1), dec!(1)),
                Bar::flat(date(2024, 1, 2), dec!(2)),
                Bar::flat(date(2024, 1, 2), dec!(99)),
            ],
        );

        assert_eq!(series.len(), 3);
        let closes: Vec<_> = series.bars().iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![dec!(1), dec!(2), dec!(3)]);
    }

    #[test]
    fn test_window_is_closed_interval() {
        let bars = (1..=10)
            .map(|d| Bar::flat(date(2024, 3, d), Decimal::from(d)))
            .collect();
        let series = PriceSeries::new("TEST", bars);

        let window = series.window(date(2024, 3, 3), date(2024, 3, 5));
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].date, date(2024, 3, 3));
        assert_eq!(window[2].date, date(2024, 3, 5));

        assert!(series.window(date(2024, 4, 1), date(2024, 4, 30)).is_empty());
        assert!(series.window(date(2024, 3, 5), date(2024, 3, 1)).is_empty());
    }

    #[test]
    fn test_year_month() {
        let bar = Bar::flat(date(2023, 12, 29), dec!(1));
        assert_eq!(bar.year_month(), (2023, 12));
    }
}
