//! Historical strategy simulation.
//!
//! Replays the crossover signal over a full price series and compounds the
//! realized returns. The exposure decided at the close of period `i-1` is
//! applied to the return over period `i` — the signal never earns the
//! return of the period it was computed from.

use chrono::NaiveDateTime;

use super::config::EngineConfig;
use super::error::ZenithError;
use super::indicator;
use super::price::PriceSeries;

/// One point of the cumulative-return curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiPoint {
    pub timestamp: NaiveDateTime,
    pub roi: f64,
}

/// Cumulative-return curve aligned to the input series, plus its final
/// value. Stateless: recomputed from scratch on every invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub cumulative_roi: Vec<RoiPoint>,
    pub total_roi: f64,
}

/// Run the crossover strategy over `prices`.
///
/// The curve has one point per price point; `cumulative_roi[0]` is always
/// zero and indices inside the indicator warmup contribute a zero return.
/// A series too short for any signal to ever become defined is rejected
/// outright rather than reported as a flat zero-ROI curve.
pub fn run_backtest(
    prices: &PriceSeries,
    config: &EngineConfig,
) -> Result<BacktestResult, ZenithError> {
    let minimum = config.min_history();
    if prices.len() < minimum {
        return Err(ZenithError::InsufficientHistory {
            symbol: prices.symbol().to_string(),
            points: prices.len(),
            minimum,
        });
    }

    let indicators = indicator::compute_series(prices, config);
    let exposure: Vec<f64> = indicators
        .snapshots
        .iter()
        .map(|s| match (s.fast_ma, s.slow_ma) {
            (Some(fast), Some(slow)) if fast > slow => 1.0,
            _ => 0.0,
        })
        .collect();

    let points = prices.points();
    let mut cumulative_roi = Vec::with_capacity(points.len());
    let mut growth = 1.0;

    for (i, point) in points.iter().enumerate() {
        if i >= 1 {
            let period_return = (points[i].close - points[i - 1].close) / points[i - 1].close;
            growth *= 1.0 + exposure[i - 1] * period_return;
        }
        cumulative_roi.push(RoiPoint {
            timestamp: point.timestamp,
            roi: growth - 1.0,
        });
    }

    let total_roi = cumulative_roi[cumulative_roi.len() - 1].roi;
    Ok(BacktestResult {
        cumulative_roi,
        total_roi,
    })
}
