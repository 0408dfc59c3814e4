//! 거래량 지표 (Volume Indicators).
//!
//! - OBV (On-Balance Volume): 종가 상승일 거래량은 더하고 하락일은 뺍니다.
//! - 거래량 비율: 현재 거래량 / 이동평균 거래량

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{require, require_period, IndicatorError, IndicatorResult};

/// OBV 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObvResult {
    /// 누적 OBV 값.
    pub obv: Decimal,
    /// 전일 대비 변화량.
    pub change: Decimal,
}

/// 거래량 지표 계산기.
#[derive(Debug, Default)]
pub struct VolumeIndicators;

impl VolumeIndicators {
    pub fn new() -> Self {
        Self
    }

    /// OBV 계산.
    ///
    /// - 종가 상승: OBV += 거래량
    /// - 종가 하락: OBV -= 거래량
    /// - 종가 동일: 변화 없음
    pub fn obv(&self, close: &[Decimal], volume: &[Decimal]) -> IndicatorResult<Vec<ObvResult>> {
        if close.len() != volume.len() {
            return Err(IndicatorError::InvalidParameter(
                "종가와 거래량 데이터의 길이가 일치하지 않습니다".to_string(),
            ));
        }
        require(close.len(), 2)?;

        let mut result = Vec::with_capacity(close.len());
        let mut current = Decimal::ZERO;
        result.push(ObvResult {
            obv: current,
            change: Decimal::ZERO,
        });

        for i in 1..close.len() {
            let change = match close[i].cmp(&close[i - 1]) {
                std::cmp::Ordering::Greater => volume[i],
                std::cmp::Ordering::Less => -volume[i],
                std::cmp::Ordering::Equal => Decimal::ZERO,
            };
            current += change;
            result.push(ObvResult { obv: current, change });
        }

        Ok(result)
    }

    /// 최근 `lookback`일 OBV 변화량의 평균.
    ///
    /// 양수면 매집(강세), 음수면 분산(약세)으로 해석합니다.
    pub fn obv_trend(&self, obv: &[ObvResult], lookback: usize) -> IndicatorResult<Decimal> {
        require_period(lookback)?;
        require(obv.len(), lookback)?;
        let recent = &obv[obv.len() - lookback..];
        let sum: Decimal = recent.iter().map(|r| r.change).sum();
        Ok(sum / Decimal::from(lookback))
    }

    /// 현재 거래량 / 최근 `period`일 평균 거래량 (현재 봉 포함).
    ///
    /// 평균 거래량이 0이거나 비율이 표현 범위를 넘으면 `None`.
    pub fn volume_ratio(&self, volume: &[Decimal], period: usize) -> IndicatorResult<Option<Decimal>> {
        require_period(period)?;
        require(volume.len(), period)?;
        let window = &volume[volume.len() - period..];
        let avg = window.iter().sum::<Decimal>() / Decimal::from(period);
        Ok(volume[volume.len() - 1].checked_div(avg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_obv_accumulation() {
        let volume_ind = VolumeIndicators::new();
        let close = vec![dec!(10), dec!(11), dec!(10.5), dec!(10.5), dec!(12)];
        let volume = vec![dec!(100), dec!(200), dec!(150), dec!(300), dec!(400)];

        let obv = volume_ind.obv(&close, &volume).unwrap();
        let values: Vec<Decimal> = obv.iter().map(|r| r.obv).collect();
        assert_eq!(values, vec![dec!(0), dec!(200), dec!(50), dec!(50), dec!(450)]);

        let trend = volume_ind.obv_trend(&obv, 4).unwrap();
        assert_eq!(trend, dec!(112.5));
    }

    #[test]
    fn test_obv_length_mismatch() {
        let volume_ind = VolumeIndicators::new();
        let result = volume_ind.obv(&[dec!(1), dec!(2)], &[dec!(1)]);
        assert!(matches!(result, Err(IndicatorError::InvalidParameter(_))));
    }

    #[test]
    fn test_volume_ratio() {
        let volume_ind = VolumeIndicators::new();
        let volume = vec![dec!(100), dec!(100), dec!(100), dec!(300)];
        assert_eq!(volume_ind.volume_ratio(&volume, 4).unwrap(), Some(dec!(2)));

        let zero = vec![Decimal::ZERO; 4];
        assert_eq!(volume_ind.volume_ratio(&zero, 4).unwrap(), None);
    }
}
