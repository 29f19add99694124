pub mod engine;
pub mod questions;
pub mod scoring;

pub use engine::{FunnelEngine, FunnelReply};
pub use questions::{question_for_step, render_question, FunnelQuestion, STEP_COUNT};
pub use scoring::{recommend, Recommendation, RecommendationSet, ScoringWeights, RELEVANCE_FLOOR};
