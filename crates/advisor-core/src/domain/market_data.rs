//! 시장 데이터 타입 및 구조체.
//!
//! 이 모듈은 시장 데이터 관련 타입을 정의합니다:
//! - `Bar` - 일봉 OHLCV 데이터
//! - `PriceSeries` - 한 종목의 검증된 일봉 시계열

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, AdvisorResult};
use crate::types::{DecimalExt, Price, Volume};

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
    pub volume: Volume,
}

impl Bar {
    /// 새 일봉을 생성합니다.
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Volume,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 시가/고가/저가/종가가 모두 같은 일봉을 생성합니다.
    ///
    /// 종가만 있는 데이터(예: 추세 검증용)를 다룰 때 사용합니다.
    pub fn flat(date: NaiveDate, close: Price, volume: Volume) -> Self {
        Self::new(date, close, close, close, close, volume)
    }

    fn validate(&self) -> AdvisorResult<()> {
        for (name, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if value <= Decimal::ZERO {
                return Err(AdvisorError::MalformedSeries(format!(
                    "{}: {} 가격은 0보다 커야 합니다 ({})",
                    self.date, name, value
                )));
            }
        }

        if self.high < self.low {
            return Err(AdvisorError::MalformedSeries(format!(
                "{}: 고가({})가 저가({})보다 낮습니다",
                self.date, self.high, self.low
            )));
        }

        if self.volume < Decimal::ZERO {
            return Err(AdvisorError::MalformedSeries(format!(
                "{}: 거래량은 음수일 수 없습니다 ({})",
                self.date, self.volume
            )));
        }

        Ok(())
    }
}

/// 한 종목의 일봉 시계열.
///
/// 생성 시 검증되며 이후 변경할 수 없습니다:
/// - 최소 1개 이상의 일봉
/// - 날짜는 엄격히 증가 (휴장일 등 공백은 허용)
/// - 모든 가격은 0보다 큼
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceSeries")]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

/// 역직렬화 직후 검증 전의 시계열.
#[derive(Deserialize)]
struct RawPriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl TryFrom<RawPriceSeries> for PriceSeries {
    type Error = AdvisorError;

    fn try_from(raw: RawPriceSeries) -> Result<Self, Self::Error> {
        PriceSeries::new(raw.symbol, raw.bars)
    }
}

impl PriceSeries {
    /// 검증된 시계열을 생성합니다.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> AdvisorResult<Self> {
        if bars.is_empty() {
            return Err(AdvisorError::MalformedSeries(
                "시계열에 일봉이 없습니다".to_string(),
            ));
        }

        for bar in &bars {
            bar.validate()?;
        }

        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(AdvisorError::MalformedSeries(format!(
                "날짜가 증가하지 않습니다: {} 다음 {}",
                pair[0].date, pair[1].date
            )));
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    /// 종가 목록으로 시계열을 생성합니다.
    ///
    /// `start`부터 하루씩 증가하는 날짜와 거래량 0을 사용합니다.
    pub fn from_closes(
        symbol: impl Into<String>,
        start: NaiveDate,
        closes: &[Price],
    ) -> AdvisorResult<Self> {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let date = start + chrono::Duration::days(i as i64);
                Bar::flat(date, close, Decimal::ZERO)
            })
            .collect();
        Self::new(symbol, bars)
    }

    /// 종목 심볼.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// 전체 일봉.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// 일봉 개수.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// 비어 있는지 확인합니다 (검증된 시계열은 항상 false).
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 마지막 일봉.
    pub fn last(&self) -> &Bar {
        // 생성자에서 비어 있지 않음을 보장합니다.
        &self.bars[self.bars.len() - 1]
    }

    /// 현재가 (마지막 종가).
    pub fn current_price(&self) -> Price {
        self.last().close
    }

    /// 종가 목록.
    pub fn closes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// 고가 목록.
    pub fn highs(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.high).collect()
    }

    /// 저가 목록.
    pub fn lows(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// 거래량 목록.
    pub fn volumes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// f64 종가 목록 (통계 계산용).
    pub fn closes_f64(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close.as_f64()).collect()
    }
}
