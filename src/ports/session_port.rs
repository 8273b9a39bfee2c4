//! Session store port trait.

use crate::domain::error::ZenithError;
use crate::domain::portfolio::PortfolioState;

/// External store for per-session portfolio state. Single-writer by
/// assumption; each session's state is isolated.
pub trait SessionPort {
    /// `None` when the session has never been saved.
    fn load(&self, session: &str) -> Result<Option<PortfolioState>, ZenithError>;

    fn save(&self, session: &str, state: &PortfolioState) -> Result<(), ZenithError>;
}
