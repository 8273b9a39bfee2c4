//! Rolling-mean and oscillator computation.
//!
//! Two simple moving averages (fast/slow) plus an RSI-style bounded
//! oscillator built from simple rolling means of per-period gains and
//! losses:
//!
//! `osc = 100 - 100 / (1 + avg_gain / avg_loss)`
//!
//! Edge cases are fixed here and pinned by tests:
//! - `avg_loss == 0` with `avg_gain > 0` yields 100 (no division).
//! - a perfectly flat window (both averages zero) yields 50, the neutral
//!   midpoint.
//! - warmup indices are `None`, never 0.0 or NaN.

use chrono::NaiveDateTime;

use super::config::EngineConfig;
use super::price::PriceSeries;

/// Indicator values at a single timestamp. `None` means the window has not
/// filled yet; callers must treat it as a distinct state, not as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub timestamp: NaiveDateTime,
    pub fast_ma: Option<f64>,
    pub slow_ma: Option<f64>,
    pub oscillator: Option<f64>,
}

impl IndicatorSnapshot {
    /// True when every indicator is defined, i.e. a trading decision is
    /// possible at this timestamp.
    pub fn is_complete(&self) -> bool {
        self.fast_ma.is_some() && self.slow_ma.is_some() && self.oscillator.is_some()
    }
}

/// Per-timestamp snapshots aligned 1:1 with the price series they were
/// computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub snapshots: Vec<IndicatorSnapshot>,
}

impl IndicatorSeries {
    pub fn last(&self) -> Option<&IndicatorSnapshot> {
        self.snapshots.last()
    }
}

/// Simple rolling mean: `Some(mean)` of the `window` values ending at each
/// index, `None` while fewer than `window` values are available.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    // Each window is re-summed rather than kept as a running total, so
    // long series accumulate no float drift. Window sizes here are tiny.
    (0..values.len())
        .map(|i| {
            if i + 1 >= window {
                Some(values[i + 1 - window..=i].iter().sum::<f64>() / window as f64)
            } else {
                None
            }
        })
        .collect()
}

/// RSI-style oscillator over `window` price changes. Index `i` is defined
/// once `window` changes ending at `i` exist, i.e. from index `window`
/// onward. Every defined value lies in `[0, 100]`.
pub fn oscillator(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 || closes.len() < 2 {
        return vec![None; closes.len()];
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for i in 1..closes.len() {
        let delta = closes[i] - closes[i - 1];
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let avg_gains = rolling_mean(&gains, window);
    let avg_losses = rolling_mean(&losses, window);

    let mut out = vec![None; closes.len()];
    for i in window..closes.len() {
        let (avg_gain, avg_loss) = match (avg_gains[i - 1], avg_losses[i - 1]) {
            (Some(g), Some(l)) => (g, l),
            _ => continue,
        };
        out[i] = Some(oscillator_value(avg_gain, avg_loss));
    }
    out
}

fn oscillator_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            // Flat window: neither gains nor losses. Neutral by convention.
            50.0
        } else {
            100.0
        }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Compute the full indicator series for a price series.
pub fn compute_series(prices: &PriceSeries, config: &EngineConfig) -> IndicatorSeries {
    let closes = prices.closes();
    let fast = rolling_mean(&closes, config.fast_window);
    let slow = rolling_mean(&closes, config.slow_window);
    let osc = oscillator(&closes, config.oscillator_window);

    let snapshots = prices
        .points()
        .iter()
        .enumerate()
        .map(|(i, point)| IndicatorSnapshot {
            timestamp: point.timestamp,
            fast_ma: fast[i],
            slow_ma: slow[i],
            oscillator: osc[i],
        })
        .collect();

    IndicatorSeries { snapshots }
}

/// Snapshot at the most recent price point, the live decision point.
///
/// A series shorter than [`EngineConfig::min_history`] yields a fully
/// undefined snapshot even when some individual window has already
/// filled: the live decision requires the whole indicator set, so the
/// joint threshold is `max(windows) + 1` points, not each window's own.
pub fn latest_snapshot(prices: &PriceSeries, config: &EngineConfig) -> IndicatorSnapshot {
    if prices.len() < config.min_history() {
        return IndicatorSnapshot {
            timestamp: prices.last().timestamp,
            fast_ma: None,
            slow_ma: None,
            oscillator: None,
        };
    }
    let series = compute_series(prices, config);
    // PriceSeries is never empty, so neither is the aligned series.
    series.snapshots[series.snapshots.len() - 1]
}
