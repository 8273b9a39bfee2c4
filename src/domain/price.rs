//! Close-price series representation.

use chrono::NaiveDateTime;
use std::fmt;

use super::error::ZenithError;

/// Sampling granularity of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Hourly,
    Daily,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Hourly => "1h",
            Interval::Daily => "1d",
        }
    }

    pub fn parse(value: &str) -> Option<Interval> {
        match value.to_lowercase().as_str() {
            "1h" | "hourly" | "hour" => Some(Interval::Hourly),
            "1d" | "daily" | "day" => Some(Interval::Daily),
            _ => None,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single close observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub close: f64,
}

/// An ordered, validated sequence of close prices.
///
/// Construction enforces: non-empty, strictly increasing timestamps
/// (no duplicates), and every close strictly positive. Anything that
/// holds a `PriceSeries` can rely on those without re-checking.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: &str, points: Vec<PricePoint>) -> Result<Self, ZenithError> {
        if points.is_empty() {
            return Err(ZenithError::NoData {
                symbol: symbol.to_string(),
            });
        }
        for (i, point) in points.iter().enumerate() {
            if point.close <= 0.0 || !point.close.is_finite() {
                return Err(ZenithError::DataSource {
                    reason: format!(
                        "non-positive close {} for {} at {}",
                        point.close, symbol, point.timestamp
                    ),
                });
            }
            if i > 0 && point.timestamp <= points[i - 1].timestamp {
                return Err(ZenithError::DataSource {
                    reason: format!(
                        "timestamps for {} not strictly increasing at {}",
                        symbol, point.timestamp
                    ),
                });
            }
        }
        Ok(PriceSeries {
            symbol: symbol.to_string(),
            points,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// The most recent observation. Always present: empty series cannot
    /// be constructed.
    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }

    /// The trailing `n` points as a new series (all of them if `n` exceeds
    /// the length).
    pub fn tail(&self, n: usize) -> PriceSeries {
        let start = self.points.len().saturating_sub(n);
        PriceSeries {
            symbol: self.symbol.clone(),
            points: self.points[start..].to_vec(),
        }
    }
}
