//! Contracts for the external collaborators the core consumes. The real
//! implementations (catalog publisher, message transport, durable order
//! store) live outside this workspace; the in-memory versions here back the
//! tests and the CLI simulation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use ordena_core::{BranchId, CatalogSnapshot, ConversationKey, CustomerId, OrderDraft, OrderRef};

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Current catalog snapshot for a branch. May be empty; callers must
    /// tolerate that and fall back.
    async fn get_catalog(&self, branch_id: &BranchId) -> Result<CatalogSnapshot>;
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Delivers one outbound message. At-least-once, best-effort; a failure
    /// must never block a state transition.
    async fn send(&self, branch_id: &BranchId, customer_id: &CustomerId, text: &str)
        -> Result<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_draft(&self, key: &ConversationKey, draft: &OrderDraft) -> Result<OrderRef>;
    /// Logically voids an order; the aggregate itself is kept by the owner.
    async fn void_order(&self, order_ref: &OrderRef) -> Result<()>;
}

/// Catalog provider backed by published catalog text, rebuilt per publish.
#[derive(Default)]
pub struct InMemoryCatalogProvider {
    snapshots: Mutex<HashMap<BranchId, CatalogSnapshot>>,
}

impl InMemoryCatalogProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the branch snapshot with a fresh parse of `text`.
    pub async fn publish(&self, branch_id: BranchId, text: &str) {
        let snapshot = CatalogSnapshot::parse_text(text);
        self.snapshots.lock().await.insert(branch_id, snapshot);
    }
}

#[async_trait]
impl CatalogProvider for InMemoryCatalogProvider {
    async fn get_catalog(&self, branch_id: &BranchId) -> Result<CatalogSnapshot> {
        Ok(self.snapshots.lock().await.get(branch_id).cloned().unwrap_or_default())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMessage {
    pub branch_id: BranchId,
    pub customer_id: CustomerId,
    pub text: String,
}

/// Recording fake for assertions; can be switched into a failing mode to
/// exercise the "delivery failures never block transitions" contract.
#[derive(Default)]
pub struct RecordingNotificationSender {
    sent: Mutex<Vec<SentMessage>>,
    fail_sends: AtomicBool,
}

impl RecordingNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_sends.store(failing, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn send(
        &self,
        branch_id: &BranchId,
        customer_id: &CustomerId,
        text: &str,
    ) -> Result<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(anyhow!("transport rejected the message"));
        }
        self.sent.lock().await.push(SentMessage {
            branch_id: branch_id.clone(),
            customer_id: customer_id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredOrder {
    pub key: ConversationKey,
    pub draft: OrderDraft,
    pub voided: bool,
}

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<HashMap<OrderRef, StoredOrder>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn order(&self, order_ref: &OrderRef) -> Option<StoredOrder> {
        self.orders.lock().await.get(order_ref).cloned()
    }

    pub async fn voided_count(&self) -> usize {
        self.orders.lock().await.values().filter(|order| order.voided).count()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_draft(&self, key: &ConversationKey, draft: &OrderDraft) -> Result<OrderRef> {
        let order_ref = OrderRef(format!("ord-{}", Uuid::new_v4()));
        self.orders.lock().await.insert(
            order_ref.clone(),
            StoredOrder { key: key.clone(), draft: draft.clone(), voided: false },
        );
        Ok(order_ref)
    }

    async fn void_order(&self, order_ref: &OrderRef) -> Result<()> {
        let mut orders = self.orders.lock().await;
        let order = orders
            .get_mut(order_ref)
            .ok_or_else(|| anyhow!("unknown order reference {}", order_ref.0))?;
        order.voided = true;
        Ok(())
    }
}
