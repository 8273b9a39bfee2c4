//! Paper-trading portfolio state machine.
//!
//! Binary allocation: the portfolio is either fully in cash or fully in
//! the asset, never a blend. The only mutations are the two transitions
//! below; everything else is a no-op that leaves the state untouched.

use chrono::NaiveDateTime;
use std::fmt;

use super::error::ZenithError;
use super::signal::Signal;

/// Which side of the binary allocation the portfolio is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationState {
    Cash,
    Invested,
}

impl AllocationState {
    pub fn parse(value: &str) -> Option<AllocationState> {
        match value {
            "CASH" => Some(AllocationState::Cash),
            "INVESTED" => Some(AllocationState::Invested),
            _ => None,
        }
    }
}

impl fmt::Display for AllocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationState::Cash => write!(f, "CASH"),
            AllocationState::Invested => write!(f, "INVESTED"),
        }
    }
}

/// One executed reallocation, emitted for the trade log.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRecord {
    pub timestamp: NaiveDateTime,
    pub from: AllocationState,
    pub to: AllocationState,
    pub price: f64,
    pub valuation: f64,
}

/// Session-scoped portfolio state. Owned by the caller (the session store
/// supplies it and persists it); the engine holds no hidden copy.
///
/// Invariant: at most one of `cash_balance` / `asset_units` is strictly
/// positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub cash_balance: f64,
    pub asset_units: f64,
    pub starting_capital: f64,
}

impl PortfolioState {
    pub fn new(starting_capital: f64) -> Self {
        PortfolioState {
            cash_balance: starting_capital,
            asset_units: 0.0,
            starting_capital,
        }
    }

    pub fn state(&self) -> AllocationState {
        if self.asset_units > 0.0 {
            AllocationState::Invested
        } else {
            AllocationState::Cash
        }
    }

    /// Apply one `(signal, price)` observation.
    ///
    /// Transitions: Cash + Bullish invests everything; Invested + Bearish
    /// liquidates everything. Every other pair, including any signal of
    /// `InsufficientData`, is a no-op. A non-positive price rejects the
    /// step outright and leaves the state unchanged.
    pub fn apply(
        &mut self,
        signal: Signal,
        price: f64,
        timestamp: NaiveDateTime,
    ) -> Result<Option<TransitionRecord>, ZenithError> {
        if price <= 0.0 || !price.is_finite() {
            return Err(ZenithError::InvalidPrice { price });
        }

        let from = self.state();
        match (from, signal) {
            (AllocationState::Cash, Signal::Bullish) => {
                self.asset_units = self.cash_balance / price;
                self.cash_balance = 0.0;
            }
            (AllocationState::Invested, Signal::Bearish) => {
                self.cash_balance = self.asset_units * price;
                self.asset_units = 0.0;
            }
            _ => return Ok(None),
        }

        let to = self.state();
        Ok(Some(TransitionRecord {
            timestamp,
            from,
            to,
            price,
            valuation: self.valuation(price)?,
        }))
    }

    /// Mark-to-market value: the cash balance when in cash, otherwise the
    /// position valued at `price`.
    pub fn valuation(&self, price: f64) -> Result<f64, ZenithError> {
        match self.state() {
            AllocationState::Cash => Ok(self.cash_balance),
            AllocationState::Invested => {
                if price <= 0.0 || !price.is_finite() {
                    return Err(ZenithError::InvalidPrice { price });
                }
                Ok(self.asset_units * price)
            }
        }
    }

    pub fn profit(&self, price: f64) -> Result<f64, ZenithError> {
        Ok(self.valuation(price)? - self.starting_capital)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn allocation_state_round_trips_through_display() {
        for state in [AllocationState::Cash, AllocationState::Invested] {
            assert_eq!(AllocationState::parse(&state.to_string()), Some(state));
        }
        assert_eq!(AllocationState::parse("MARGIN"), None);
    }

    #[test]
    fn new_portfolio_is_all_cash() {
        let portfolio = PortfolioState::new(10_000.0);
        assert_eq!(portfolio.state(), AllocationState::Cash);
        assert!((portfolio.cash_balance - 10_000.0).abs() < f64::EPSILON);
        assert!((portfolio.asset_units - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bullish_invests_everything() {
        let mut portfolio = PortfolioState::new(10_000.0);
        let record = portfolio.apply(Signal::Bullish, 100.0, ts(9)).unwrap();

        assert_eq!(portfolio.state(), AllocationState::Invested);
        assert!((portfolio.asset_units - 100.0).abs() < f64::EPSILON);
        assert!((portfolio.cash_balance - 0.0).abs() < f64::EPSILON);

        let record = record.unwrap();
        assert_eq!(record.from, AllocationState::Cash);
        assert_eq!(record.to, AllocationState::Invested);
        assert!((record.valuation - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bearish_liquidates_everything() {
        let mut portfolio = PortfolioState::new(10_000.0);
        portfolio.apply(Signal::Bullish, 100.0, ts(9)).unwrap();
        let record = portfolio.apply(Signal::Bearish, 110.0, ts(10)).unwrap();

        assert_eq!(portfolio.state(), AllocationState::Cash);
        assert!((portfolio.cash_balance - 11_000.0).abs() < f64::EPSILON);
        assert!((portfolio.asset_units - 0.0).abs() < f64::EPSILON);
        assert!((portfolio.profit(110.0).unwrap() - 1_000.0).abs() < f64::EPSILON);

        let record = record.unwrap();
        assert_eq!(record.from, AllocationState::Invested);
        assert!((record.valuation - 11_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn repeated_signal_is_noop() {
        let mut portfolio = PortfolioState::new(10_000.0);
        portfolio.apply(Signal::Bullish, 100.0, ts(9)).unwrap();
        let before = portfolio.clone();

        let record = portfolio.apply(Signal::Bullish, 120.0, ts(10)).unwrap();
        assert!(record.is_none());
        assert_eq!(portfolio, before);
    }

    #[test]
    fn bearish_in_cash_is_noop() {
        let mut portfolio = PortfolioState::new(10_000.0);
        let record = portfolio.apply(Signal::Bearish, 100.0, ts(9)).unwrap();
        assert!(record.is_none());
        assert_eq!(portfolio.state(), AllocationState::Cash);
    }

    #[test]
    fn insufficient_data_never_transitions() {
        let mut portfolio = PortfolioState::new(10_000.0);
        let record = portfolio
            .apply(Signal::InsufficientData, 100.0, ts(9))
            .unwrap();
        assert!(record.is_none());

        portfolio.apply(Signal::Bullish, 100.0, ts(10)).unwrap();
        let record = portfolio
            .apply(Signal::InsufficientData, 90.0, ts(11))
            .unwrap();
        assert!(record.is_none());
        assert_eq!(portfolio.state(), AllocationState::Invested);
    }

    #[test]
    fn non_positive_price_rejected_state_preserved() {
        let mut portfolio = PortfolioState::new(10_000.0);
        let before = portfolio.clone();

        for bad in [0.0, -1.0, f64::NAN] {
            let err = portfolio.apply(Signal::Bullish, bad, ts(9)).unwrap_err();
            assert!(matches!(err, ZenithError::InvalidPrice { .. }));
            assert_eq!(portfolio, before);
        }
    }

    #[test]
    fn valuation_in_cash_ignores_price_movement() {
        let portfolio = PortfolioState::new(10_000.0);
        assert!((portfolio.valuation(42.0).unwrap() - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn valuation_invested_rejects_bad_price() {
        let mut portfolio = PortfolioState::new(10_000.0);
        portfolio.apply(Signal::Bullish, 100.0, ts(9)).unwrap();
        let err = portfolio.valuation(0.0).unwrap_err();
        assert!(matches!(err, ZenithError::InvalidPrice { .. }));
    }

    #[test]
    fn value_is_conserved_through_a_transition() {
        let mut portfolio = PortfolioState::new(10_000.0);
        portfolio.apply(Signal::Bullish, 137.5, ts(9)).unwrap();
        // Investing at price p and valuing at the same p is the identity.
        assert!((portfolio.valuation(137.5).unwrap() - 10_000.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn binary_allocation_invariant_holds(
            steps in proptest::collection::vec((0u8..3, 0.01f64..100_000.0), 1..60),
        ) {
            let mut portfolio = PortfolioState::new(10_000.0);
            for (kind, price) in steps {
                let signal = match kind {
                    0 => Signal::Bullish,
                    1 => Signal::Bearish,
                    _ => Signal::InsufficientData,
                };
                portfolio.apply(signal, price, ts(0)).unwrap();
                let cash_positive = portfolio.cash_balance > 0.0;
                let units_positive = portfolio.asset_units > 0.0;
                prop_assert!(
                    cash_positive != units_positive,
                    "exactly one of cash/units must be positive: {:?}",
                    portfolio
                );
            }
        }
    }
}
