use thiserror::Error;

use crate::sessions::SessionTransitionError;

/// Failure taxonomy for the conversational core. Every variant maps to a
/// concrete caller obligation: re-prompt, reject, fall back, or start fresh.
/// No variant ever leaves a session in an intermediate state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Out-of-range or non-numeric funnel answer; the caller re-prompts the
    /// same question and nothing advances.
    #[error("answer is not a valid option for question {step}")]
    InvalidInput { step: u8 },
    /// A funnel interview is already active for this key; never overwritten.
    #[error("a recommendation interview is already active for this conversation")]
    AlreadyActive,
    /// The branch has no catalog right now; the caller must fall back.
    #[error("no catalog is available for this branch")]
    CatalogUnavailable,
    /// Nothing cleared the relevance floor; the caller shows the full catalog.
    #[error("no catalog entry met the relevance floor")]
    NoMatch,
    /// The referenced session does not exist or is terminal; the router
    /// treats this as "start fresh", not as a hard failure.
    #[error("no live session exists for this conversation")]
    NotFound,
    #[error(transparent)]
    Transition(#[from] SessionTransitionError),
}
