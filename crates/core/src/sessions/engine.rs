use thiserror::Error;

use crate::sessions::states::{SessionAction, SessionEvent, SessionState, TransitionOutcome};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionTransitionError {
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: SessionState, event: SessionEvent },
}

/// Pure transition table for the conversation lifecycle. The runtime owns
/// timers, stores, and notifications; this function only decides the target
/// state and which actions the runtime must execute.
///
/// Confirming an already-completed session is a no-op rather than an error,
/// so the public confirm operation stays idempotent.
pub fn transition(
    current: &SessionState,
    event: &SessionEvent,
) -> Result<TransitionOutcome, SessionTransitionError> {
    use SessionAction::{
        ArmCancellationTimer, ArmReminderTimer, ReleaseDraftOrder, SendCancellationNotice,
        SendReminder,
    };
    use SessionEvent::{
        Activity, CancellationElapsed, Greeting, MenuRequested, OrderConfirmed, ReminderElapsed,
    };
    use SessionState::{Canceled, Completed, WaitingReminder};

    let (to, actions) = match (current, event) {
        (Completed, OrderConfirmed) => (Completed, Vec::new()),
        (state, event) if state.is_terminal() => {
            return Err(SessionTransitionError::InvalidTransition {
                state: *state,
                event: *event,
            });
        }
        (_, Greeting) => (SessionState::Greeting, vec![ArmReminderTimer]),
        (_, Activity) | (_, MenuRequested) => (SessionState::MenuRequested, vec![ArmReminderTimer]),
        (_, OrderConfirmed) => (Completed, Vec::new()),
        (SessionState::Greeting, ReminderElapsed) | (SessionState::MenuRequested, ReminderElapsed) => {
            (WaitingReminder, vec![SendReminder, ArmCancellationTimer])
        }
        (WaitingReminder, CancellationElapsed) => {
            (Canceled, vec![SendCancellationNotice, ReleaseDraftOrder])
        }
        _ => {
            return Err(SessionTransitionError::InvalidTransition {
                state: *current,
                event: *event,
            });
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: *event, actions })
}

#[cfg(test)]
mod tests {
    use crate::sessions::engine::{transition, SessionTransitionError};
    use crate::sessions::states::{SessionAction, SessionEvent, SessionState};

    #[test]
    fn inactivity_cascade_reaches_cancellation() {
        let reminded = transition(&SessionState::Greeting, &SessionEvent::ReminderElapsed)
            .expect("greeting -> waiting_reminder");
        assert_eq!(reminded.to, SessionState::WaitingReminder);
        assert_eq!(
            reminded.actions,
            vec![SessionAction::SendReminder, SessionAction::ArmCancellationTimer]
        );

        let canceled = transition(&reminded.to, &SessionEvent::CancellationElapsed)
            .expect("waiting_reminder -> canceled");
        assert_eq!(canceled.to, SessionState::Canceled);
        assert_eq!(
            canceled.actions,
            vec![SessionAction::SendCancellationNotice, SessionAction::ReleaseDraftOrder]
        );
    }

    #[test]
    fn activity_from_waiting_reminder_returns_to_menu_requested() {
        let outcome = transition(&SessionState::WaitingReminder, &SessionEvent::Activity)
            .expect("waiting_reminder -> menu_requested");
        assert_eq!(outcome.to, SessionState::MenuRequested);
        assert_eq!(outcome.actions, vec![SessionAction::ArmReminderTimer]);
    }

    #[test]
    fn any_activity_rearms_the_reminder_timer() {
        for state in [
            SessionState::Greeting,
            SessionState::MenuRequested,
            SessionState::WaitingReminder,
        ] {
            let outcome =
                transition(&state, &SessionEvent::Activity).expect("activity always accepted");
            assert_eq!(outcome.to, SessionState::MenuRequested);
            assert!(outcome.actions.contains(&SessionAction::ArmReminderTimer));
        }
    }

    #[test]
    fn confirm_is_valid_from_any_non_terminal_state() {
        for state in [
            SessionState::Greeting,
            SessionState::MenuRequested,
            SessionState::WaitingReminder,
        ] {
            let outcome =
                transition(&state, &SessionEvent::OrderConfirmed).expect("confirm accepted");
            assert_eq!(outcome.to, SessionState::Completed);
            assert!(outcome.actions.is_empty());
        }
    }

    #[test]
    fn confirming_a_completed_session_is_a_noop() {
        let outcome = transition(&SessionState::Completed, &SessionEvent::OrderConfirmed)
            .expect("idempotent confirm");
        assert_eq!(outcome.to, SessionState::Completed);
        assert!(outcome.actions.is_empty());
    }

    #[test]
    fn terminal_states_reject_further_events() {
        for state in [SessionState::Completed, SessionState::Canceled] {
            for event in [
                SessionEvent::Activity,
                SessionEvent::ReminderElapsed,
                SessionEvent::CancellationElapsed,
                SessionEvent::Greeting,
            ] {
                let error = transition(&state, &event).expect_err("terminal state is final");
                assert!(matches!(error, SessionTransitionError::InvalidTransition { .. }));
            }
        }
    }

    #[test]
    fn cancellation_cannot_fire_without_a_pending_reminder() {
        for state in [SessionState::Greeting, SessionState::MenuRequested] {
            let error = transition(&state, &SessionEvent::CancellationElapsed)
                .expect_err("cancellation only follows the reminder");
            assert!(matches!(error, SessionTransitionError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn replay_is_deterministic_for_same_event_sequence() {
        let events = [
            SessionEvent::Activity,
            SessionEvent::ReminderElapsed,
            SessionEvent::Activity,
            SessionEvent::OrderConfirmed,
        ];

        let run = || {
            let mut state = SessionState::Greeting;
            let mut actions = Vec::new();
            for event in &events {
                let outcome = transition(&state, event).expect("deterministic run");
                actions.push(outcome.actions.clone());
                state = outcome.to;
            }
            (state, actions)
        };

        assert_eq!(run(), run());
    }
}
