//! Trend signal and risk classification.
//!
//! Pure functions of an [`IndicatorSnapshot`]; no market state is consulted.

use std::fmt;

use super::config::EngineConfig;
use super::indicator::IndicatorSnapshot;

/// Directional signal from the moving-average crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Bullish,
    Bearish,
    /// One or more indicators are still in warmup; consumers must not
    /// trade on this state.
    InsufficientData,
}

/// Overbought/oversold classification from the oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskFlag {
    HighRisk,
    Safe,
    Unknown,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Bullish => write!(f, "BULLISH"),
            Signal::Bearish => write!(f, "BEARISH"),
            Signal::InsufficientData => write!(f, "INSUFFICIENT DATA"),
        }
    }
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskFlag::HighRisk => write!(f, "HIGH RISK"),
            RiskFlag::Safe => write!(f, "SAFE"),
            RiskFlag::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Evaluate a snapshot into a trend signal and a risk flag.
///
/// The crossover comparison is strict: `fast_ma == slow_ma` is Bearish.
/// The risk check is two-sided: the oscillator flags high risk above the
/// overbought threshold and below the oversold threshold.
pub fn evaluate(snapshot: &IndicatorSnapshot, config: &EngineConfig) -> (Signal, RiskFlag) {
    let signal = match (snapshot.fast_ma, snapshot.slow_ma, snapshot.oscillator) {
        (Some(fast), Some(slow), Some(_)) => {
            if fast > slow {
                Signal::Bullish
            } else {
                Signal::Bearish
            }
        }
        _ => Signal::InsufficientData,
    };

    let risk = match snapshot.oscillator {
        Some(osc) => {
            if osc > config.overbought_threshold || osc < config.oversold_threshold {
                RiskFlag::HighRisk
            } else {
                RiskFlag::Safe
            }
        }
        None => RiskFlag::Unknown,
    };

    (signal, risk)
}
