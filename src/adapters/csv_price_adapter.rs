//! CSV file price adapter.
//!
//! Serves prices from `{base_path}/{SYMBOL}_{interval}.csv` files with a
//! `timestamp,close` header, timestamps formatted `%Y-%m-%d %H:%M:%S`.
//! Stands in for the external market-data feed.

use crate::domain::error::ZenithError;
use crate::domain::price::{Interval, PricePoint, PriceSeries};
use crate::ports::price_port::PricePort;
use chrono::NaiveDateTime;
use std::path::PathBuf;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, interval))
    }

    fn read_series(&self, symbol: &str, interval: Interval) -> Result<PriceSeries, ZenithError> {
        let path = self.csv_path(symbol, interval);
        if !path.exists() {
            return Err(ZenithError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let mut rdr = csv::Reader::from_path(&path).map_err(|e| ZenithError::DataSource {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| ZenithError::DataSource {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let timestamp_str = record.get(0).ok_or_else(|| ZenithError::DataSource {
                reason: format!("missing timestamp column in {}", path.display()),
            })?;
            let timestamp = NaiveDateTime::parse_from_str(timestamp_str, TIMESTAMP_FORMAT)
                .map_err(|e| ZenithError::DataSource {
                    reason: format!("invalid timestamp '{}': {}", timestamp_str, e),
                })?;

            let close: f64 = record
                .get(1)
                .ok_or_else(|| ZenithError::DataSource {
                    reason: format!("missing close column in {}", path.display()),
                })?
                .parse()
                .map_err(|e| ZenithError::DataSource {
                    reason: format!("invalid close value: {}", e),
                })?;

            points.push(PricePoint { timestamp, close });
        }

        // Ordering, duplicates and positivity are enforced here; a file
        // that violates them is a data fault, not a silent skip.
        PriceSeries::new(symbol, points)
    }
}

impl PricePort for CsvPriceAdapter {
    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: usize,
    ) -> Result<PriceSeries, ZenithError> {
        Ok(self.read_series(symbol, interval)?.tail(lookback))
    }

    fn data_range(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, ZenithError> {
        match self.read_series(symbol, interval) {
            Ok(series) => Ok(Some((
                series.points()[0].timestamp,
                series.last().timestamp,
                series.len(),
            ))),
            Err(ZenithError::NoData { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
