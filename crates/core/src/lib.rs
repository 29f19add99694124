pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod funnel;
pub mod matching;
pub mod sessions;

pub use commands::{classify_command, CommandKind};
pub use domain::catalog::{CatalogEntry, CatalogSnapshot};
pub use domain::ids::{BranchId, ConversationKey, CustomerId, OrderRef};
pub use domain::order::{OrderDraft, OrderLine};
pub use domain::session::{ConversationSession, FunnelSession, FunnelStatus};
pub use errors::EngineError;
pub use funnel::{FunnelEngine, FunnelReply, Recommendation, RecommendationSet};
pub use matching::{extract_order, MATCH_THRESHOLD};
pub use sessions::{
    transition, SessionAction, SessionEvent, SessionState, SessionTransitionError,
    TransitionOutcome,
};
