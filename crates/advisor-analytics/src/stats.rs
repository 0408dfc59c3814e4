//! f64 통계 유틸리티.
//!
//! 구조 감지, 가격 예측, 시장 신호에서 공통으로 사용하는 수익률,
//! 분산, 최소제곱 회귀, 분위수 계산을 모아 둡니다.

/// 산술 평균. 빈 입력은 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 모표준편차 (n으로 나눔). 빈 입력은 0.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// 표본표준편차 (n - 1로 나눔). 2개 미만은 0.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// 로그 수익률 ln(p[i] / p[i-1]).
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (w[1] / w[0]).ln())
        .collect()
}

/// 단순 수익률 p[i] / p[i-1] - 1.
pub fn pct_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// 선형 정렬된 값의 분위수 (선형 보간, q ∈ [0, 1]).
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let frac = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

/// 최소제곱 회귀 결과 (x = 0, 1, ..., n-1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// 결정계수. 분산이 0인 입력은 완전 적합으로 1.
    pub r_squared: f64,
    /// 잔차 표준오차 (자유도 n - 2)
    pub residual_se: f64,
    pub n: usize,
    x_mean: f64,
    sxx: f64,
}

impl LinearFit {
    /// x에서의 적합값.
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// x에서의 예측 구간 계수 √(1 + 1/n + (x - x̄)² / Sxx).
    pub fn prediction_factor(&self, x: f64) -> f64 {
        if self.sxx <= 0.0 {
            return 1.0;
        }
        (1.0 + 1.0 / self.n as f64 + (x - self.x_mean).powi(2) / self.sxx).sqrt()
    }
}

/// 인덱스를 x로 하는 최소제곱 회귀. 2개 미만이면 `None`.
pub fn linear_regression(values: &[f64]) -> Option<LinearFit> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxx += dx * dx;
        sxy += dx * (y - y_mean);
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, y) in values.iter().enumerate() {
        let fitted = intercept + slope * i as f64;
        ss_res += (y - fitted).powi(2);
        ss_tot += (y - y_mean).powi(2);
    }

    let r_squared = if ss_tot > 0.0 {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let residual_se = if n > 2 {
        (ss_res / (n - 2) as f64).sqrt()
    } else {
        0.0
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
        residual_se,
        n,
        x_mean,
        sxx,
    })
}
