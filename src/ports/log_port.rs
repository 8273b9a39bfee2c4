//! Trade log port trait.

use crate::domain::error::ZenithError;
use crate::domain::portfolio::TransitionRecord;

/// Append-only log of portfolio transitions, keyed by session. The engine
/// emits one record per executed transition; persistence mechanics belong
/// to the implementation.
pub trait TradeLogPort {
    fn append(&self, session: &str, record: &TransitionRecord) -> Result<(), ZenithError>;

    /// Records appended so far for `session`, oldest first.
    fn read_all(&self, session: &str) -> Result<Vec<TransitionRecord>, ZenithError>;
}
