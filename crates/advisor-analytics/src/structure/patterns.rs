//! 규칙 기반 차트 패턴 감지.
//!
//! - 쌍봉/쌍바닥: 최근 두 고점(저점)의 높이 차이
//! - 삼각형: 최근 W개 고가/저가 회귀 기울기
//! - 깃발: 급등/급락(폴) 이후의 저변동성 횡보

use advisor_core::{ChartPattern, PatternKind, StructureConfig};

use super::levels::Extremum;
use crate::stats;

/// 최근 두 고점(저점)이 허용 오차 안에서 같은 높이인지 확인합니다.
///
/// 두 극값 사이에 반대 극값이 하나 이상 있어야 합니다.
/// 신뢰도 = 1 - 높이 차이 / 허용 오차.
pub fn detect_double(
    extrema: &[Extremum],
    opposite: &[Extremum],
    kind: PatternKind,
    tolerance: f64,
) -> Option<ChartPattern> {
    let [first, second] = extrema.get(extrema.len().checked_sub(2)?..)? else {
        return None;
    };
    if first.price <= 0.0 {
        return None;
    }
    let separated = opposite
        .iter()
        .any(|o| o.index > first.index && o.index < second.index);
    if !separated {
        return None;
    }

    let diff = (second.price - first.price).abs() / first.price;
    if diff >= tolerance {
        return None;
    }
    Some(ChartPattern::new(
        kind,
        1.0 - diff / tolerance,
        first.index,
        second.index,
    ))
}

/// 기울기 방향 (가격 정규화 후).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slope {
    Rising,
    Flat,
    Falling,
}

fn classify_slope(normalized: f64, flat: f64) -> Slope {
    if normalized.abs() < flat {
        Slope::Flat
    } else if normalized > 0.0 {
        Slope::Rising
    } else {
        Slope::Falling
    }
}

/// 최근 W개 고가/저가의 회귀 기울기로 삼각형을 판정합니다.
///
/// 신뢰도는 두 회귀의 결정계수 평균입니다.
pub fn detect_triangle(highs: &[f64], lows: &[f64], config: &StructureConfig) -> Option<ChartPattern> {
    let w = config.window;
    let n = highs.len().min(lows.len());
    if n < w || w < 2 {
        return None;
    }

    let recent_highs = &highs[n - w..];
    let recent_lows = &lows[n - w..];
    let high_fit = stats::linear_regression(recent_highs)?;
    let low_fit = stats::linear_regression(recent_lows)?;

    let high_mean = stats::mean(recent_highs);
    let low_mean = stats::mean(recent_lows);
    if high_mean <= 0.0 || low_mean <= 0.0 {
        return None;
    }

    let high_slope = classify_slope(high_fit.slope / high_mean, config.flat_slope);
    let low_slope = classify_slope(low_fit.slope / low_mean, config.flat_slope);

    let kind = match (high_slope, low_slope) {
        (Slope::Flat, Slope::Rising) => PatternKind::AscendingTriangle,
        (Slope::Falling, Slope::Flat) => PatternKind::DescendingTriangle,
        (Slope::Falling, Slope::Rising) => PatternKind::SymmetricalTriangle,
        _ => return None,
    };

    let confidence = (high_fit.r_squared + low_fit.r_squared) / 2.0;
    Some(ChartPattern::new(kind, confidence, n - w, n - 1))
}

/// 폴 구간 [n-2W, n-W]의 수익률과 최근 W개 수익률의 표준편차로 깃발을 판정합니다.
///
/// 신뢰도 = min(1, |폴| / (2 × 폴 임계값)) × (1 - 표준편차 / 최대 표준편차).
pub fn detect_flag(closes: &[f64], config: &StructureConfig) -> Option<ChartPattern> {
    let w = config.window;
    let n = closes.len();
    if n < 2 * w + 1 {
        return None;
    }

    let pole_start = closes[n - 2 * w];
    let pole_end = closes[n - w];
    if pole_start <= 0.0 {
        return None;
    }
    let pole = pole_end / pole_start - 1.0;
    if pole.abs() < config.flag_pole_threshold {
        return None;
    }

    let returns = stats::pct_returns(&closes[n - w - 1..]);
    let std = stats::sample_std(&returns);
    if std >= config.flag_max_std {
        return None;
    }

    let kind = if pole > 0.0 {
        PatternKind::BullFlag
    } else {
        PatternKind::BearFlag
    };
    let strength = (pole.abs() / (2.0 * config.flag_pole_threshold)).min(1.0);
    let tightness = 1.0 - std / config.flag_max_std;
    Some(ChartPattern::new(kind, strength * tightness, n - 2 * w, n - 1))
}
