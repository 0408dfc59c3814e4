//! 투영 기간.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AdvisorError, AdvisorResult};

/// 예측 기간 (거래일 수, 1 ~ 90).
///
/// 범위를 벗어난 값은 잘라내지 않고 거부합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Horizon(u32);

impl Horizon {
    /// 최소 기간.
    pub const MIN_DAYS: u32 = 1;
    /// 최대 기간.
    pub const MAX_DAYS: u32 = 90;

    /// 새 기간을 생성합니다.
    pub fn new(days: u32) -> AdvisorResult<Self> {
        if !(Self::MIN_DAYS..=Self::MAX_DAYS).contains(&days) {
            return Err(AdvisorError::InvalidParameter(format!(
                "예측 기간은 {}~{}일이어야 합니다: {}",
                Self::MIN_DAYS,
                Self::MAX_DAYS,
                days
            )));
        }
        Ok(Self(days))
    }

    /// 일 수를 반환합니다.
    pub fn days(&self) -> u32 {
        self.0
    }

    /// 일 수를 usize로 반환합니다.
    pub fn steps(&self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u32> for Horizon {
    type Error = AdvisorError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        Horizon::new(days)
    }
}

impl From<Horizon> for u32 {
    fn from(horizon: Horizon) -> Self {
        horizon.0
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_horizon_bounds() {
        assert!(Horizon::new(0).is_err());
        assert!(Horizon::new(91).is_err());
        assert_eq!(Horizon::new(1).unwrap().days(), 1);
        assert_eq!(Horizon::new(90).unwrap().days(), 90);
    }

    #[test]
    fn test_horizon_rejects_not_clamps() {
        let err = Horizon::new(120).unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidParameter(_)));
    }

    #[test]
    fn test_horizon_serde() {
        let h: Horizon = serde_json::from_str("30").unwrap();
        assert_eq!(h.days(), 30);
        assert!(serde_json::from_str::<Horizon>("0").is_err());
        assert_eq!(serde_json::to_string(&h).unwrap(), "30");
    }

    proptest! {
        #[test]
        fn horizon_accepts_exactly_valid_range(days in 0u32..200) {
            let valid = (Horizon::MIN_DAYS..=Horizon::MAX_DAYS).contains(&days);
            prop_assert_eq!(Horizon::new(days).is_ok(), valid);
        }
    }
}
