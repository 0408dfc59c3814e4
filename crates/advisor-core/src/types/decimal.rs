//! 정밀한 가격 계산을 위한 Decimal 유틸리티.
//!
//! 가격과 지표 값은 `Decimal`로, 통계적 투영과 점수는 `f64`로 다룹니다.
//! 이 모듈은 두 표현 사이의 변환을 한곳에 모아 둡니다.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// 가격 타입.
pub type Price = Decimal;

/// 거래량 타입.
pub type Volume = Decimal;

/// 퍼센트 타입 (0.01 = 1%).
pub type Percentage = Decimal;

/// f64에서 변환된 가격의 소수점 자릿수.
pub const PRICE_SCALE: u32 = 4;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// f64로 변환합니다.
    fn as_f64(&self) -> f64;

    /// 지정된 소수점 자릿수로 반올림합니다 (0.5는 0에서 먼 쪽으로).
    fn round_half_away(&self, dp: u32) -> Decimal;
}

impl DecimalExt for Decimal {
    fn as_f64(&self) -> f64 {
        // Decimal 범위는 f64 범위 안에 있으므로 변환은 실패하지 않습니다.
        self.to_f64().unwrap_or(0.0)
    }

    fn round_half_away(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }
}

/// f64 가격을 `PRICE_SCALE` 자리로 반올림된 Decimal로 변환합니다.
///
/// NaN/무한대는 `None`을 반환합니다.
pub fn price_from_f64(value: f64) -> Option<Price> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value).map(|d| d.round_half_away(PRICE_SCALE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use proptest::prelude::*;

    #[test]
    fn test_decimal_ext() {
        let d = dec!(0.0525);
        assert!((d.as_f64() - 0.0525).abs() < 1e-12);
        assert_eq!(dec!(2.5).round_half_away(0), dec!(3));
        assert_eq!(dec!(-2.5).round_half_away(0), dec!(-3));
    }

    #[test]
    fn test_price_from_f64() {
        assert_eq!(price_from_f64(120.0), Some(dec!(120)));
        assert_eq!(price_from_f64(101.123456), Some(dec!(101.1235)));
        assert_eq!(price_from_f64(f64::NAN), None);
        assert_eq!(price_from_f64(f64::INFINITY), None);
    }

    proptest! {
        #[test]
        fn price_from_f64_keeps_scale(value in 0.0001f64..1_000_000.0) {
            let price = price_from_f64(value).unwrap();
            prop_assert!(price.scale() <= PRICE_SCALE);
            prop_assert!((price.as_f64() - value).abs() <= 0.00005 + 1e-9);
        }
    }
}
