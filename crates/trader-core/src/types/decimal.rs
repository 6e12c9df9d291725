//! 금융 계산을 위한 Decimal 유틸리티.
//!
//! 가격·수량·현금은 `Decimal`로 정확하게 유지하고, 수익률·변동성 같은
//! 통계 값은 `f64`로 계산합니다. 두 세계의 경계에서 이 모듈의 헬퍼를 사용합니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 거래 수량 타입 (정수 단위 매매지만 Decimal로 보관).
pub type Quantity = Decimal;

/// 현금/평가금액 타입.
pub type Amount = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// f64로 변환합니다. 표현할 수 없으면 0.0을 반환합니다.
    fn to_f64_lossy(&self) -> f64;

    /// 0으로 나누는 경우 `None`을 반환하는 나눗셈.
    fn checked_ratio(&self, denominator: Decimal) -> Option<Decimal>;
}

impl DecimalExt for Decimal {
    fn to_f64_lossy(&self) -> f64 {
        self.to_f64().unwrap_or(0.0)
    }

    fn checked_ratio(&self, denominator: Decimal) -> Option<Decimal> {
        if denominator.is_zero() {
            None
        } else {
            self.checked_div(denominator)
        }
    }
}

/// 예산 안에서 살 수 있는 정수 단위 수량을 계산합니다.
///
/// floor(budget / price). 가격이 0 이하이거나 예산이 음수면 0을 반환합니다.
pub fn whole_units(budget: Decimal, price: Decimal) -> Quantity {
    if price <= Decimal::ZERO || budget <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    budget
        .checked_div(price)
        .map(|q| q.floor())
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_whole_units() {
        assert_eq!(whole_units(dec!(100000), dec!(3000)), dec!(33));
        assert_eq!(whole_units(dec!(100), dec!(0)), dec!(0));
        assert_eq!(whole_units(dec!(-5), dec!(1)), dec!(0));
        assert_eq!(whole_units(dec!(99.99), dec!(10)), dec!(9));
    }

    #[test]
    fn test_checked_ratio() {
        assert_eq!(dec!(1).checked_ratio(dec!(0)), None);
        assert_eq!(dec!(1).checked_ratio(dec!(4)), Some(dec!(0.25)));
    }
}
