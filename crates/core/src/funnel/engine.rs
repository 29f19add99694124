use crate::commands::{classify_command, CommandKind};
use crate::domain::catalog::CatalogSnapshot;
use crate::domain::ids::ConversationKey;
use crate::domain::session::{FunnelSession, FunnelStatus};
use crate::errors::EngineError;
use crate::funnel::questions::{question_for_step, render_question, STEP_COUNT};
use crate::funnel::scoring::{recommend, RecommendationSet, ScoringWeights};

/// Outcome of feeding one customer message to an active interview.
#[derive(Clone, Debug, PartialEq)]
pub enum FunnelReply {
    /// Ask (or re-ask) the question for `step`.
    Question { step: u8, text: String },
    /// The customer canceled the interview with a cancellation keyword.
    Canceled,
    /// An escape command ended the interview; the router should now handle
    /// the command through its normal dispatch.
    Escape { command: CommandKind },
    /// All five answers are in and a recommendation was produced.
    Completed { result: RecommendationSet },
}

/// Bookkeeping for the five-question interview. Holds no per-conversation
/// state itself; the caller owns the `FunnelSession` records and their
/// exclusivity (one active interview per key).
#[derive(Clone, Debug, Default)]
pub struct FunnelEngine {
    weights: ScoringWeights,
}

impl FunnelEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Opens a fresh interview and returns question #1. The caller must
    /// reject the start with `AlreadyActive` when an active session already
    /// exists for the key.
    pub fn start(
        &self,
        key: ConversationKey,
        party_size_hint: Option<u32>,
    ) -> (FunnelSession, FunnelReply) {
        let session = FunnelSession::new(key, party_size_hint);
        let text = render_question(1).expect("question 1 exists");
        (session, FunnelReply::Question { step: 1, text })
    }

    /// Feeds one raw message to the interview.
    ///
    /// Invalid answers return `InvalidInput` and leave the session untouched
    /// so the same question can be re-prompted. Cancellation and escape
    /// keywords terminate the interview at any step. A scoring failure after
    /// the fifth answer cancels the interview and surfaces the failure for
    /// the caller's fallback.
    pub fn answer(
        &self,
        session: &mut FunnelSession,
        raw: &str,
        catalog: &CatalogSnapshot,
    ) -> Result<FunnelReply, EngineError> {
        if !session.is_active() {
            return Err(EngineError::NotFound);
        }

        match classify_command(raw) {
            CommandKind::Cancel => {
                session.status = FunnelStatus::Canceled;
                return Ok(FunnelReply::Canceled);
            }
            command @ (CommandKind::MenuRequest | CommandKind::HoursRequest) => {
                session.status = FunnelStatus::Canceled;
                return Ok(FunnelReply::Escape { command });
            }
            _ => {}
        }

        let step = session.current_step;
        let question = question_for_step(step).expect("active session step is in range");
        let choice = raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|choice| (1..=question.options.len()).contains(choice))
            .ok_or(EngineError::InvalidInput { step })?;

        session.answers.push(choice);

        if step < STEP_COUNT {
            session.current_step = step + 1;
            let text = render_question(session.current_step).expect("next question exists");
            return Ok(FunnelReply::Question { step: session.current_step, text });
        }

        match recommend(catalog, &session.answers, session.party_size, &self.weights) {
            Ok(result) => {
                session.status = FunnelStatus::Completed;
                Ok(FunnelReply::Completed { result })
            }
            Err(error) => {
                session.status = FunnelStatus::Canceled;
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::commands::CommandKind;
    use crate::domain::catalog::{CatalogEntry, CatalogSnapshot};
    use crate::domain::ids::ConversationKey;
    use crate::domain::session::FunnelStatus;
    use crate::errors::EngineError;

    use super::{FunnelEngine, FunnelReply};

    fn catalog_fixture() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            CatalogEntry {
                canonical_name: "Cappuccino".to_string(),
                category: "bebidas".to_string(),
                unit_price: Decimal::new(350, 2),
                aliases: vec!["capuchino".to_string()],
            },
            CatalogEntry {
                canonical_name: "Ensalada César".to_string(),
                category: "almuerzo".to_string(),
                unit_price: Decimal::new(850, 2),
                aliases: Vec::new(),
            },
        ])
    }

    fn key() -> ConversationKey {
        ConversationKey::new("cust-1", "branch-1")
    }

    #[test]
    fn full_interview_produces_a_scaled_recommendation() {
        let engine = FunnelEngine::new();
        let catalog = catalog_fixture();
        let (mut session, first) = engine.start(key(), Some(3));
        assert!(matches!(first, FunnelReply::Question { step: 1, .. }));

        let mut reply = None;
        for raw in ["1", "5", "1", "1", "3"] {
            reply = Some(engine.answer(&mut session, raw, &catalog).expect("valid answer"));
        }

        let Some(FunnelReply::Completed { result }) = reply else {
            panic!("expected a completed interview");
        };
        assert_eq!(session.status, FunnelStatus::Completed);
        assert_eq!(result.main.product_name, "Cappuccino");
        assert_eq!(result.main.total_price, result.main.unit_price * Decimal::from(3u32));
    }

    #[test]
    fn invalid_answers_do_not_advance_the_step() {
        let engine = FunnelEngine::new();
        let catalog = catalog_fixture();
        let (mut session, _) = engine.start(key(), None);

        for raw in ["abc", "0", "99", "  "] {
            let error = engine.answer(&mut session, raw, &catalog).expect_err("invalid answer");
            assert_eq!(error, EngineError::InvalidInput { step: 1 });
            assert_eq!(session.current_step, 1);
            assert!(session.answers.is_empty());
        }

        let reply = engine.answer(&mut session, "2", &catalog).expect("valid answer");
        assert!(matches!(reply, FunnelReply::Question { step: 2, .. }));
    }

    #[test]
    fn cancellation_keyword_terminates_the_interview() {
        let engine = FunnelEngine::new();
        let catalog = catalog_fixture();
        let (mut session, _) = engine.start(key(), None);

        let reply = engine.answer(&mut session, "cancelar", &catalog).expect("cancel handled");
        assert_eq!(reply, FunnelReply::Canceled);
        assert_eq!(session.status, FunnelStatus::Canceled);

        let error = engine.answer(&mut session, "1", &catalog).expect_err("interview is over");
        assert_eq!(error, EngineError::NotFound);
    }

    #[test]
    fn menu_request_escapes_back_to_the_router() {
        let engine = FunnelEngine::new();
        let catalog = catalog_fixture();
        let (mut session, _) = engine.start(key(), None);
        engine.answer(&mut session, "2", &catalog).expect("first answer");

        let reply = engine.answer(&mut session, "ver el menú", &catalog).expect("escape handled");
        assert_eq!(reply, FunnelReply::Escape { command: CommandKind::MenuRequest });
        assert_eq!(session.status, FunnelStatus::Canceled);
    }

    #[test]
    fn empty_catalog_cancels_the_interview_at_scoring_time() {
        let engine = FunnelEngine::new();
        let catalog = CatalogSnapshot::default();
        let (mut session, _) = engine.start(key(), None);

        for raw in ["1", "1", "1", "1"] {
            engine.answer(&mut session, raw, &catalog).expect("answers accepted");
        }
        let error = engine.answer(&mut session, "1", &catalog).expect_err("no catalog");
        assert_eq!(error, EngineError::CatalogUnavailable);
        assert_eq!(session.status, FunnelStatus::Canceled);
    }

    #[test]
    fn party_size_hint_defaults_to_one() {
        let engine = FunnelEngine::new();
        let (session, _) = engine.start(key(), None);
        assert_eq!(session.party_size, 1);
        let (session, _) = engine.start(key(), Some(0));
        assert_eq!(session.party_size, 1);
    }
}
