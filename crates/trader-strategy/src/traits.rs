//! Strategy trait 정의.

use trader_core::{Bar, Portfolio};

/// 백테스트 전략의 일별 스텝 계약.
///
/// 엔진이 실행마다 새 인스턴스를 만들고 원장(`Portfolio`)을 소유합니다.
/// 전략은 `Portfolio::buy`/`sell`로만 거래하며, 체결 조건(현금 충분, 보유 수량)은
/// 원장이 검사합니다. 호출 순서는 `on_start` → 일봉마다 `on_bar` → 마지막 일봉에서 `finalize`.
pub trait Strategy: Send + Sync {
    /// 전략 타입 태그 (예: "monthly_rotation").
    fn name(&self) -> &str;

    /// 실행 전 전체 구간 일봉으로 사전 계산.
    fn on_start(&mut self, _bars: &[Bar]) {}

    /// 일봉 하나에 대해 매매 여부를 판단하고 체결합니다.
    fn on_bar(&mut self, index: usize, bar: &Bar, portfolio: &mut Portfolio);

    /// 마지막 일봉에서 호출됩니다 (강제 청산 등).
    fn finalize(&mut self, _bar: &Bar, _portfolio: &mut Portfolio) {}
}
