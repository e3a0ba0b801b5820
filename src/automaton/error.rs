use std::time::Duration;

use thiserror::Error;

use super::store::Phase;

/// Result type alias for automaton construction.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by automaton construction.
///
/// All errors propagate synchronously out of the call that induced them; a
/// failed build leaves no partial automaton behind.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// `build` was called with zero targets.
    #[error("cannot build an automaton from an empty target list")]
    EmptyInput,

    /// A target was the empty string.
    #[error("the empty string is not a valid target")]
    EmptyTarget,

    /// A construction phase exceeded its configured time budget.
    #[error("construction exceeded the phase budget of {0:?}")]
    Timeout(Duration),

    /// The store detected an internal inconsistency; construction aborts.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// An operation was attempted in the wrong lifecycle phase.
    #[error("operation not permitted in the {0:?} phase")]
    Phase(Phase),
}
