//! 앙상블: 개별 예측의 단순 평균.

use advisor_core::{ConfidenceBand, MethodProjection};

/// 예측 가격, 신뢰 구간, 경로를 각각 평균합니다.
///
/// 입력이 비어 있으면 `None`. 평균이므로 앙상블 가격은 항상 개별 예측의
/// 최소값과 최대값 사이에 있습니다.
pub fn ensemble<'a>(
    current_price: f64,
    projections: impl IntoIterator<Item = &'a MethodProjection>,
) -> Option<MethodProjection> {
    let projections: Vec<&MethodProjection> = projections.into_iter().collect();
    if projections.is_empty() {
        return None;
    }
    let count = projections.len() as f64;

    let price = projections.iter().map(|p| p.projected_price).sum::<f64>() / count;
    let low = projections.iter().map(|p| p.band.low).sum::<f64>() / count;
    let high = projections.iter().map(|p| p.band.high).sum::<f64>() / count;

    let steps = projections.iter().map(|p| p.path.len()).min().unwrap_or(0);
    let path = (0..steps)
        .map(|t| projections.iter().map(|p| p.path[t]).sum::<f64>() / count)
        .collect();

    // 합산 반올림 오차로 범위를 벗어나지 않도록 개별 예측 범위로 제한
    let min = projections.iter().map(|p| p.projected_price).fold(f64::INFINITY, f64::min);
    let max = projections.iter().map(|p| p.projected_price).fold(f64::NEG_INFINITY, f64::max);
    let price = price.clamp(min, max);

    Some(MethodProjection::new(
        current_price,
        price,
        ConfidenceBand::new(low, high),
        path,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection(price: f64, low: f64, high: f64) -> MethodProjection {
        MethodProjection::new(100.0, price, ConfidenceBand::new(low, high), vec![price; 3])
    }

    #[test]
    fn test_ensemble_mean() {
        let items = [projection(110.0, 100.0, 120.0), projection(90.0, 80.0, 100.0)];
        let result = ensemble(100.0, &items).unwrap();

        assert_eq!(result.projected_price, 100.0);
        assert_eq!(result.band.low, 90.0);
        assert_eq!(result.band.high, 110.0);
        assert_eq!(result.path, vec![100.0; 3]);
        assert_eq!(result.percent_change, 0.0);
    }

    #[test]
    fn test_ensemble_empty() {
        assert!(ensemble(100.0, &Vec::<MethodProjection>::new()).is_none());
    }
}
