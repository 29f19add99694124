use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{ConversationKey, OrderRef};
use crate::sessions::SessionState;

/// Conversation-level state record, one per (customer, branch) key.
///
/// Created on the first greeting-type message, mutated on every inbound
/// message and by timer callbacks, and replaced wholesale when a new
/// greeting arrives after a terminal state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub key: ConversationKey,
    pub state: SessionState,
    pub last_activity_at: DateTime<Utc>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub has_active_draft_order: bool,
    pub active_order_ref: Option<OrderRef>,
}

impl ConversationSession {
    pub fn new(key: ConversationKey, now: DateTime<Utc>) -> Self {
        Self {
            key,
            state: SessionState::Greeting,
            last_activity_at: now,
            reminder_sent_at: None,
            has_active_draft_order: false,
            active_order_ref: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Registers fresh activity: bumps the activity clock and clears the
    /// reminder flag so a new inactivity streak starts from scratch.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity_at = now;
        self.reminder_sent_at = None;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStatus {
    Active,
    Completed,
    Canceled,
}

/// Interview state for the five-question recommendation funnel. While
/// `status` is `Active` this record exclusively owns message interpretation
/// for its key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelSession {
    pub key: ConversationKey,
    pub party_size: u32,
    pub current_step: u8,
    pub answers: Vec<usize>,
    pub status: FunnelStatus,
}

impl FunnelSession {
    pub fn new(key: ConversationKey, party_size_hint: Option<u32>) -> Self {
        Self {
            key,
            party_size: party_size_hint.filter(|size| *size >= 1).unwrap_or(1),
            current_step: 1,
            answers: Vec::with_capacity(5),
            status: FunnelStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == FunnelStatus::Active
    }
}
