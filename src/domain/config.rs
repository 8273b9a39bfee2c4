//! Engine configuration and construction-time validation.
//!
//! All fields are validated when the config is built from a [`ConfigPort`];
//! an invalid value is a fatal [`ZenithError::ConfigInvalid`], never a
//! silent fallback to a default.

use crate::domain::error::ZenithError;
use crate::domain::price::Interval;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_STARTING_CAPITAL: f64 = 10_000.0;
pub const DEFAULT_FAST_WINDOW: usize = 25;
pub const DEFAULT_SLOW_WINDOW: usize = 30;
pub const DEFAULT_OSCILLATOR_WINDOW: usize = 14;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;
pub const DEFAULT_OVERSOLD: f64 = 30.0;

/// Strategy and capital parameters for the indicator engine, the portfolio
/// state machine, and the backtest simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub starting_capital: f64,
    pub fast_window: usize,
    pub slow_window: usize,
    pub oscillator_window: usize,
    pub overbought_threshold: f64,
    pub oversold_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            starting_capital: DEFAULT_STARTING_CAPITAL,
            fast_window: DEFAULT_FAST_WINDOW,
            slow_window: DEFAULT_SLOW_WINDOW,
            oscillator_window: DEFAULT_OSCILLATOR_WINDOW,
            overbought_threshold: DEFAULT_OVERBOUGHT,
            oversold_threshold: DEFAULT_OVERSOLD,
        }
    }
}

impl EngineConfig {
    /// Build from the `[engine]` section of a config source, validating
    /// every field. A key that is present but unparseable is fatal, never
    /// silently replaced by its default; only an absent key defaults.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ZenithError> {
        let engine = EngineConfig {
            starting_capital: read_double(
                config,
                "engine",
                "starting_capital",
                DEFAULT_STARTING_CAPITAL,
            )?,
            fast_window: read_count(config, "engine", "fast_window", DEFAULT_FAST_WINDOW)?,
            slow_window: read_count(config, "engine", "slow_window", DEFAULT_SLOW_WINDOW)?,
            oscillator_window: read_count(
                config,
                "engine",
                "oscillator_window",
                DEFAULT_OSCILLATOR_WINDOW,
            )?,
            overbought_threshold: read_double(
                config,
                "engine",
                "overbought_threshold",
                DEFAULT_OVERBOUGHT,
            )?,
            oversold_threshold: read_double(
                config,
                "engine",
                "oversold_threshold",
                DEFAULT_OVERSOLD,
            )?,
        };
        engine.validate()?;
        Ok(engine)
    }

    pub fn validate(&self) -> Result<(), ZenithError> {
        if self.starting_capital <= 0.0 || !self.starting_capital.is_finite() {
            return Err(invalid("engine", "starting_capital", "must be positive"));
        }
        if self.fast_window < 1 {
            return Err(invalid("engine", "fast_window", "must be >= 1"));
        }
        if self.slow_window < 1 {
            return Err(invalid("engine", "slow_window", "must be >= 1"));
        }
        if self.oscillator_window < 1 {
            return Err(invalid("engine", "oscillator_window", "must be >= 1"));
        }
        if !(0.0..=100.0).contains(&self.overbought_threshold)
            || !(0.0..=100.0).contains(&self.oversold_threshold)
        {
            return Err(invalid(
                "engine",
                "overbought_threshold",
                "thresholds must lie in [0, 100]",
            ));
        }
        if self.oversold_threshold >= self.overbought_threshold {
            return Err(invalid(
                "engine",
                "oversold_threshold",
                "oversold_threshold must be below overbought_threshold",
            ));
        }
        Ok(())
    }

    /// Minimum number of price points for every indicator to be defined:
    /// the oscillator consumes one point per price change, so the longest
    /// window needs one extra observation.
    pub fn min_history(&self) -> usize {
        self.fast_window
            .max(self.slow_window)
            .max(self.oscillator_window)
            + 1
    }
}

/// Market data selection: which symbol to watch and how much history to
/// request for the live and historical passes.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketConfig {
    pub symbol: String,
    pub live_interval: Interval,
    pub live_lookback: usize,
    pub backtest_interval: Interval,
    pub backtest_lookback: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        // Mirrors the shape of a 5-day hourly live window and a 1-year
        // daily backtest window.
        MarketConfig {
            symbol: "BTC-USD".to_string(),
            live_interval: Interval::Hourly,
            live_lookback: 120,
            backtest_interval: Interval::Daily,
            backtest_lookback: 365,
        }
    }
}

impl MarketConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ZenithError> {
        let defaults = MarketConfig::default();

        let symbol = config
            .get_string("market", "symbol")
            .unwrap_or(defaults.symbol)
            .to_uppercase();
        if symbol.trim().is_empty() {
            return Err(ZenithError::ConfigInvalid {
                section: "market".to_string(),
                key: "symbol".to_string(),
                reason: "symbol must not be empty".to_string(),
            });
        }

        let live_interval = read_interval(config, "live_interval", defaults.live_interval)?;
        let backtest_interval =
            read_interval(config, "backtest_interval", defaults.backtest_interval)?;

        let live_lookback = read_count(config, "market", "live_lookback", defaults.live_lookback)?;
        let backtest_lookback = read_count(
            config,
            "market",
            "backtest_lookback",
            defaults.backtest_lookback,
        )?;

        Ok(MarketConfig {
            symbol,
            live_interval,
            live_lookback,
            backtest_interval,
            backtest_lookback,
        })
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> ZenithError {
    ZenithError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Absent key → default; present but unparseable → fatal.
fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, ZenithError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
            invalid(section, key, &format!("expected a number, got '{raw}'"))
        }),
    }
}

/// Absent key → default; present but unparseable or below 1 → fatal.
fn read_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, ZenithError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => {
            let value: i64 = raw.trim().parse().map_err(|_| {
                invalid(section, key, &format!("expected an integer, got '{raw}'"))
            })?;
            if value < 1 {
                return Err(invalid(section, key, "must be >= 1"));
            }
            Ok(value as usize)
        }
    }
}

fn read_interval(
    config: &dyn ConfigPort,
    key: &str,
    default: Interval,
) -> Result<Interval, ZenithError> {
    match config.get_string("market", key) {
        None => Ok(default),
        Some(raw) => Interval::parse(&raw).ok_or_else(|| ZenithError::ConfigInvalid {
            section: "market".to_string(),
            key: key.to_string(),
            reason: format!("unknown interval '{raw}' (expected 1h or 1d)"),
        }),
    }
}
