//! One synchronous evaluation pass.
//!
//! Each external trigger performs a single fetch → indicators → signal →
//! portfolio pass. The engine owns no state of its own: the portfolio is
//! borrowed from the caller, persisted through the session port, and every
//! transition goes out through the trade log port. The session is saved
//! before the transition is logged, so the log never records a trade the
//! stored session does not reflect.

use super::config::{EngineConfig, MarketConfig};
use super::error::ZenithError;
use super::indicator::{self, IndicatorSnapshot};
use super::portfolio::{PortfolioState, TransitionRecord};
use super::signal::{self, RiskFlag, Signal};
use crate::ports::log_port::TradeLogPort;
use crate::ports::price_port::PricePort;
use crate::ports::session_port::SessionPort;

/// Everything one refresh produced: the live decision inputs, the signal,
/// and the resulting portfolio view.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub symbol: String,
    pub price: f64,
    pub snapshot: IndicatorSnapshot,
    pub signal: Signal,
    pub risk: RiskFlag,
    pub valuation: f64,
    pub profit: f64,
    pub transition: Option<TransitionRecord>,
}

/// Run one refresh cycle against the live market window.
///
/// An empty or failing feed is a terminal error for this cycle — nothing
/// stale is consulted and the portfolio is untouched. A series that is
/// merely too short degrades to `Signal::InsufficientData` with no
/// transition; the last close still prices the portfolio.
pub fn run_refresh(
    price_source: &dyn PricePort,
    sessions: &dyn SessionPort,
    trade_log: &dyn TradeLogPort,
    portfolio: &mut PortfolioState,
    session: &str,
    config: &EngineConfig,
    market: &MarketConfig,
) -> Result<RefreshReport, ZenithError> {
    let prices = price_source.fetch(&market.symbol, market.live_interval, market.live_lookback)?;

    let latest = *prices.last();
    let snapshot = indicator::latest_snapshot(&prices, config);
    let (signal, risk) = signal::evaluate(&snapshot, config);

    let transition = portfolio.apply(signal, latest.close, latest.timestamp)?;
    sessions.save(session, portfolio)?;
    if let Some(record) = &transition {
        trade_log.append(session, record)?;
    }

    Ok(RefreshReport {
        symbol: market.symbol.clone(),
        price: latest.close,
        snapshot,
        signal,
        risk,
        valuation: portfolio.valuation(latest.close)?,
        profit: portfolio.profit(latest.close)?,
        transition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::AllocationState;
    use crate::domain::price::{Interval, PricePoint, PriceSeries};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::cell::RefCell;

    struct FixedPricePort {
        closes: Vec<f64>,
    }

    impl PricePort for FixedPricePort {
        fn fetch(
            &self,
            symbol: &str,
            _interval: Interval,
            lookback: usize,
        ) -> Result<PriceSeries, ZenithError> {
            let points: Vec<PricePoint> = self
                .closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PricePoint {
                    timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                        .unwrap()
                        .and_hms_opt(0, 0, 0)
                        .unwrap()
                        + chrono::Duration::hours(i as i64),
                    close,
                })
                .collect();
            Ok(PriceSeries::new(symbol, points)?.tail(lookback))
        }

        fn data_range(
            &self,
            _symbol: &str,
            _interval: Interval,
        ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, ZenithError> {
            Ok(None)
        }
    }

    struct EmptyPricePort;

    impl PricePort for EmptyPricePort {
        fn fetch(
            &self,
            symbol: &str,
            _interval: Interval,
            _lookback: usize,
        ) -> Result<PriceSeries, ZenithError> {
            Err(ZenithError::NoData {
                symbol: symbol.to_string(),
            })
        }

        fn data_range(
            &self,
            _symbol: &str,
            _interval: Interval,
        ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, ZenithError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct MemorySession {
        saved: RefCell<Option<PortfolioState>>,
    }

    impl SessionPort for MemorySession {
        fn load(&self, _session: &str) -> Result<Option<PortfolioState>, ZenithError> {
            Ok(self.saved.borrow().clone())
        }

        fn save(&self, _session: &str, state: &PortfolioState) -> Result<(), ZenithError> {
            *self.saved.borrow_mut() = Some(state.clone());
            Ok(())
        }
    }

    struct FailingSession;

    impl SessionPort for FailingSession {
        fn load(&self, _session: &str) -> Result<Option<PortfolioState>, ZenithError> {
            Ok(None)
        }

        fn save(&self, _session: &str, _state: &PortfolioState) -> Result<(), ZenithError> {
            Err(ZenithError::SessionStore {
                reason: "disk full".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct MemoryLog {
        records: RefCell<Vec<TransitionRecord>>,
    }

    impl TradeLogPort for MemoryLog {
        fn append(&self, _session: &str, record: &TransitionRecord) -> Result<(), ZenithError> {
            self.records.borrow_mut().push(record.clone());
            Ok(())
        }

        fn read_all(&self, _session: &str) -> Result<Vec<TransitionRecord>, ZenithError> {
            Ok(self.records.borrow().clone())
        }
    }

    fn small_setup() -> (EngineConfig, MarketConfig) {
        let config = EngineConfig {
            fast_window: 2,
            slow_window: 3,
            oscillator_window: 2,
            ..EngineConfig::default()
        };
        let market = MarketConfig {
            symbol: "TEST".to_string(),
            live_lookback: 50,
            ..MarketConfig::default()
        };
        (config, market)
    }

    #[test]
    fn rising_market_invests_and_logs() {
        let (config, market) = small_setup();
        let port = FixedPricePort {
            closes: (0..10).map(|i| 100.0 + i as f64).collect(),
        };
        let sessions = MemorySession::default();
        let log = MemoryLog::default();
        let mut portfolio = PortfolioState::new(10_000.0);

        let report = run_refresh(
            &port,
            &sessions,
            &log,
            &mut portfolio,
            "default",
            &config,
            &market,
        )
        .unwrap();

        assert_eq!(report.signal, Signal::Bullish);
        assert_eq!(portfolio.state(), AllocationState::Invested);
        assert!(report.transition.is_some());
        assert_eq!(log.records.borrow().len(), 1);
        assert!((report.price - 109.0).abs() < f64::EPSILON);
        assert!((report.valuation - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn short_series_degrades_without_transition() {
        let (config, market) = small_setup();
        let port = FixedPricePort {
            closes: vec![100.0, 101.0],
        };
        let sessions = MemorySession::default();
        let log = MemoryLog::default();
        let mut portfolio = PortfolioState::new(10_000.0);

        let report = run_refresh(
            &port,
            &sessions,
            &log,
            &mut portfolio,
            "default",
            &config,
            &market,
        )
        .unwrap();

        assert_eq!(report.signal, Signal::InsufficientData);
        assert_eq!(report.risk, RiskFlag::Unknown);
        assert!(report.transition.is_none());
        assert!(log.records.borrow().is_empty());
        assert_eq!(portfolio.state(), AllocationState::Cash);
        assert!((report.valuation - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_feed_is_terminal_for_the_cycle() {
        let (config, market) = small_setup();
        let sessions = MemorySession::default();
        let log = MemoryLog::default();
        let mut portfolio = PortfolioState::new(10_000.0);
        let before = portfolio.clone();

        let err = run_refresh(
            &EmptyPricePort,
            &sessions,
            &log,
            &mut portfolio,
            "default",
            &config,
            &market,
        )
        .unwrap_err();

        assert!(matches!(err, ZenithError::NoData { .. }));
        assert_eq!(portfolio, before);
        assert!(sessions.saved.borrow().is_none());
        assert!(log.records.borrow().is_empty());
    }

    #[test]
    fn second_bullish_refresh_is_idempotent() {
        let (config, market) = small_setup();
        let port = FixedPricePort {
            closes: (0..10).map(|i| 100.0 + i as f64).collect(),
        };
        let sessions = MemorySession::default();
        let log = MemoryLog::default();
        let mut portfolio = PortfolioState::new(10_000.0);

        run_refresh(
            &port,
            &sessions,
            &log,
            &mut portfolio,
            "default",
            &config,
            &market,
        )
        .unwrap();
        let report = run_refresh(
            &port,
            &sessions,
            &log,
            &mut portfolio,
            "default",
            &config,
            &market,
        )
        .unwrap();

        assert!(report.transition.is_none());
        assert_eq!(log.records.borrow().len(), 1);
    }

    #[test]
    fn refresh_persists_the_session() {
        let (config, market) = small_setup();
        let port = FixedPricePort {
            closes: (0..10).map(|i| 100.0 + i as f64).collect(),
        };
        let sessions = MemorySession::default();
        let log = MemoryLog::default();
        let mut portfolio = PortfolioState::new(10_000.0);

        run_refresh(
            &port,
            &sessions,
            &log,
            &mut portfolio,
            "default",
            &config,
            &market,
        )
        .unwrap();

        let saved = sessions.load("default").unwrap().unwrap();
        assert_eq!(saved, portfolio);
        assert_eq!(saved.state(), AllocationState::Invested);
    }

    #[test]
    fn failed_save_keeps_log_untouched() {
        let (config, market) = small_setup();
        let port = FixedPricePort {
            closes: (0..10).map(|i| 100.0 + i as f64).collect(),
        };
        let log = MemoryLog::default();
        let mut portfolio = PortfolioState::new(10_000.0);

        let err = run_refresh(
            &port,
            &FailingSession,
            &log,
            &mut portfolio,
            "default",
            &config,
            &market,
        )
        .unwrap_err();

        assert!(matches!(err, ZenithError::SessionStore { .. }));
        assert!(log.records.borrow().is_empty());
    }
}
