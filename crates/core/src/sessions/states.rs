use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Greeting,
    MenuRequested,
    WaitingReminder,
    Completed,
    Canceled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// A greeting-type message; the runtime resets the record wholesale.
    Greeting,
    /// Any other inbound customer message.
    Activity,
    /// An explicit menu request.
    MenuRequested,
    /// The customer confirmed the draft order.
    OrderConfirmed,
    /// The T1 reminder timer elapsed with no fresh activity.
    ReminderElapsed,
    /// The T2 cancellation timer elapsed while waiting on the reminder.
    CancellationElapsed,
}

/// Side effects the runtime must execute after applying a transition. The
/// pure engine never performs them itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    ArmReminderTimer,
    ArmCancellationTimer,
    SendReminder,
    SendCancellationNotice,
    ReleaseDraftOrder,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: SessionState,
    pub to: SessionState,
    pub event: SessionEvent,
    pub actions: Vec<SessionAction>,
}
