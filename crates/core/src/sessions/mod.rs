pub mod engine;
pub mod states;

pub use engine::{transition, SessionTransitionError};
pub use states::{SessionAction, SessionEvent, SessionState, TransitionOutcome};
