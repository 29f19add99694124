//! Injected state stores. Components never reach for a global map; they
//! receive these traits so tests can wire in-memory fakes and a deployment
//! can plug a durable backend without touching the engine.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ordena_core::{ConversationKey, ConversationSession, FunnelSession};

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &ConversationKey) -> Option<ConversationSession>;
    async fn upsert(&self, session: ConversationSession);
    /// All sessions not in a terminal state, for the recovery sweep.
    async fn non_terminal(&self) -> Vec<ConversationSession>;
}

#[async_trait]
pub trait FunnelStore: Send + Sync {
    async fn get(&self, key: &ConversationKey) -> Option<FunnelSession>;
    async fn upsert(&self, session: FunnelSession);
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<ConversationKey, ConversationSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &ConversationKey) -> Option<ConversationSession> {
        self.sessions.lock().await.get(key).cloned()
    }

    async fn upsert(&self, session: ConversationSession) {
        self.sessions.lock().await.insert(session.key.clone(), session);
    }

    async fn non_terminal(&self) -> Vec<ConversationSession> {
        self.sessions
            .lock()
            .await
            .values()
            .filter(|session| !session.is_terminal())
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct InMemoryFunnelStore {
    sessions: Mutex<HashMap<ConversationKey, FunnelSession>>,
}

impl InMemoryFunnelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FunnelStore for InMemoryFunnelStore {
    async fn get(&self, key: &ConversationKey) -> Option<FunnelSession> {
        self.sessions.lock().await.get(key).cloned()
    }

    async fn upsert(&self, session: FunnelSession) {
        self.sessions.lock().await.insert(session.key.clone(), session);
    }
}
