//! Price data access port trait.

use crate::domain::error::ZenithError;
use crate::domain::price::{Interval, PriceSeries};
use chrono::NaiveDateTime;

/// The external price feed, a synchronous and possibly-failing boundary.
/// Retries belong to the implementation, never to the engine.
pub trait PricePort {
    /// The `lookback` most recent closes for `symbol` at `interval`.
    /// An empty feed must surface as [`ZenithError::NoData`], not as an
    /// empty series.
    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: usize,
    ) -> Result<PriceSeries, ZenithError>;

    /// First timestamp, last timestamp and point count available for
    /// `symbol` at `interval`, or `None` when the feed has nothing.
    fn data_range(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, ZenithError>;
}
