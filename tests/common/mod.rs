#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

use zenith::domain::config::{EngineConfig, MarketConfig};
use zenith::domain::error::ZenithError;
use zenith::domain::price::{Interval, PricePoint, PriceSeries};
use zenith::ports::price_port::PricePort;

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn hourly_points(closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            timestamp: base_time() + chrono::Duration::hours(i as i64),
            close,
        })
        .collect()
}

pub fn hourly_series(symbol: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(symbol, hourly_points(closes)).unwrap()
}

/// Windows small enough that short hand-built series produce signals.
pub fn small_engine() -> EngineConfig {
    EngineConfig {
        fast_window: 2,
        slow_window: 3,
        oscillator_window: 2,
        ..EngineConfig::default()
    }
}

pub fn test_market(symbol: &str) -> MarketConfig {
    MarketConfig {
        symbol: symbol.to_string(),
        live_lookback: 100,
        ..MarketConfig::default()
    }
}

/// In-memory price feed keyed by symbol; unknown symbols yield NoData.
pub struct MockPricePort {
    data: HashMap<String, Vec<f64>>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.data.insert(symbol.to_string(), closes.to_vec());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch(
        &self,
        symbol: &str,
        _interval: Interval,
        lookback: usize,
    ) -> Result<PriceSeries, ZenithError> {
        match self.data.get(symbol) {
            Some(closes) => Ok(hourly_series(symbol, closes).tail(lookback)),
            None => Err(ZenithError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn data_range(
        &self,
        symbol: &str,
        _interval: Interval,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, ZenithError> {
        Ok(self.data.get(symbol).map(|closes| {
            let series = hourly_series(symbol, closes);
            (
                series.points()[0].timestamp,
                series.last().timestamp,
                series.len(),
            )
        }))
    }
}

/// Write a price CSV in the layout CsvPriceAdapter expects.
pub fn write_price_csv(dir: &std::path::Path, symbol: &str, interval: Interval, closes: &[f64]) {
    let mut body = String::from("timestamp,close\n");
    for point in hourly_points(closes) {
        body.push_str(&format!(
            "{},{}\n",
            point.timestamp.format("%Y-%m-%d %H:%M:%S"),
            point.close
        ));
    }
    std::fs::write(dir.join(format!("{}_{}.csv", symbol, interval)), body).unwrap();
}
