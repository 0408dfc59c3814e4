//! 국소 극값 탐색과 지지/저항 레벨 군집화.

use advisor_core::{price_from_f64, LevelKind, StructureLevel};

/// 고점 또는 저점 하나.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    pub index: usize,
    pub price: f64,
}

/// 중심 윈도우 `[i - W/2, i + W/2]`의 극값을 찾습니다.
///
/// 윈도우가 시계열 양 끝에서 잘리는 봉은 후보에서 제외합니다.
/// 같은 값이 이어지는 구간에서는 첫 봉만 극값으로 인정하므로,
/// 단조 시계열이나 평탄한 시계열에서는 극값이 생기지 않습니다.
pub fn find_extrema(highs: &[f64], lows: &[f64], window: usize) -> (Vec<Extremum>, Vec<Extremum>) {
    let half = window / 2;
    let n = highs.len().min(lows.len());
    let mut peaks = Vec::new();
    let mut troughs = Vec::new();

    if half == 0 || n < 2 * half + 1 {
        return (peaks, troughs);
    }

    for i in half..n - half {
        let left = i - half..i;
        let right = i + 1..=i + half;

        let h = highs[i];
        if highs[left.clone()].iter().all(|&x| h > x) && highs[right.clone()].iter().all(|&x| h >= x) {
            peaks.push(Extremum { index: i, price: h });
        }

        let l = lows[i];
        if lows[left].iter().all(|&x| l < x) && lows[right].iter().all(|&x| l <= x) {
            troughs.push(Extremum { index: i, price: l });
        }
    }

    (peaks, troughs)
}

/// 극값 가격을 상대 허용 오차 안에서 군집화하여 레벨로 만듭니다.
///
/// 가격 오름차순으로 정렬한 뒤, 현재 군집 평균과의 상대 차이가 허용 오차
/// 이내인 동안 같은 군집에 넣습니다. 레벨 가격은 군집 평균, 강도는 터치 횟수입니다.
pub fn cluster_levels(prices: &[f64], tolerance: f64, last_close: f64) -> Vec<StructureLevel> {
    let mut sorted: Vec<f64> = prices.iter().copied().filter(|p| p.is_finite() && *p > 0.0).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut clusters: Vec<(f64, usize)> = Vec::new();
    for price in sorted {
        match clusters.last_mut() {
            Some((sum, count)) if {
                let mean = *sum / *count as f64;
                (price - mean).abs() / mean <= tolerance
            } =>
            {
                *sum += price;
                *count += 1;
            }
            _ => clusters.push((price, 1)),
        }
    }

    clusters
        .into_iter()
        .filter_map(|(sum, count)| {
            let mean = sum / count as f64;
            let kind = if mean > last_close {
                LevelKind::Resistance
            } else {
                LevelKind::Support
            };
            price_from_f64(mean).map(|price| StructureLevel {
                price,
                kind,
                strength: count,
            })
        })
        .collect()
}
