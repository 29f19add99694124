//! Session Lifecycle Manager: owns one conversation record per key,
//! advances it on inbound activity, and drives the graduated
//! reminder/cancellation cascade with per-key timers.
//!
//! Concurrency discipline: every mutation for a key happens under that
//! key's mutex cell; cross-key work proceeds in parallel. Timer callbacks
//! capture a per-key generation counter at arming time and no-op when the
//! key has advanced, so a late-firing stale timer can never cancel a
//! conversation that has since seen activity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use ordena_core::config::TimerConfig;
use ordena_core::sessions::{transition, SessionAction, SessionEvent, SessionState};
use ordena_core::{ConversationKey, ConversationSession, EngineError, OrderRef};

use crate::collaborators::{NotificationSender, OrderStore};
use crate::store::SessionStore;

const REMINDER_TEXT: &str =
    "¿Sigues ahí? Tu conversación sigue abierta, respóndenos para continuar con tu pedido.";
const CANCELLATION_TEXT: &str =
    "Cerramos la conversación por inactividad. Escríbenos de nuevo cuando quieras ordenar.";

#[derive(Clone, Debug)]
pub struct LifecycleConfig {
    /// T1: inactivity before the reminder.
    pub reminder_after: Duration,
    /// T2: further inactivity before cancellation, measured from the
    /// reminder, never from session creation.
    pub cancel_after: Duration,
}

impl LifecycleConfig {
    pub fn from_timers(timers: &TimerConfig) -> Self {
        Self {
            reminder_after: timers.reminder_interval(),
            cancel_after: timers.cancellation_interval(),
        }
    }

    fn stale_cutoff(&self) -> chrono::Duration {
        chrono::Duration::seconds((self.reminder_after + self.cancel_after).as_secs() as i64)
    }
}

#[derive(Clone)]
pub struct SessionLifecycleManager {
    inner: Arc<LifecycleInner>,
}

struct LifecycleInner {
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn NotificationSender>,
    orders: Arc<dyn OrderStore>,
    config: LifecycleConfig,
    cells: Mutex<HashMap<ConversationKey, Arc<KeyCell>>>,
}

#[derive(Default)]
struct KeyCell {
    guard: Mutex<()>,
    generation: AtomicU64,
}

impl KeyCell {
    /// Invalidates every timer armed before this call and returns the
    /// generation new timers must carry.
    fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

impl SessionLifecycleManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn NotificationSender>,
        orders: Arc<dyn OrderStore>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            inner: Arc::new(LifecycleInner {
                store,
                notifier,
                orders,
                config,
                cells: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Creates or resets the session to `Greeting` and arms the reminder
    /// timer. Also the "start fresh" path after a terminal state.
    pub async fn on_greeting(&self, key: &ConversationKey) {
        let cell = self.inner.cell(key).await;
        let _guard = cell.guard.lock().await;

        let session = ConversationSession::new(key.clone(), Utc::now());
        self.inner.store.upsert(session).await;
        let generation = cell.advance();
        arm_reminder(&self.inner, key.clone(), generation);

        info!(
            event_name = "session.greeting",
            customer_id = %key.customer_id.0,
            branch_id = %key.branch_id.0,
            "session reset to greeting"
        );
    }

    /// Any inbound message for a live session: move to `MenuRequested` and
    /// restart the reminder clock, regardless of message content.
    pub async fn on_inbound_message(&self, key: &ConversationKey) -> Result<(), EngineError> {
        self.apply_activity(key, SessionEvent::Activity).await
    }

    /// Explicit menu request; same reset semantics as any other activity.
    pub async fn on_menu_requested(&self, key: &ConversationKey) -> Result<(), EngineError> {
        self.apply_activity(key, SessionEvent::MenuRequested).await
    }

    /// Completes the session and drops all pending timers. Idempotent:
    /// confirming an already-completed session changes nothing and emits
    /// no side effect.
    pub async fn on_order_confirmed(&self, key: &ConversationKey) -> Result<(), EngineError> {
        let cell = self.inner.cell(key).await;
        let _guard = cell.guard.lock().await;

        let Some(mut session) = self.inner.store.get(key).await else {
            return Err(EngineError::NotFound);
        };
        if session.state == SessionState::Completed {
            return Ok(());
        }

        let outcome = transition(&session.state, &SessionEvent::OrderConfirmed)?;
        session.state = outcome.to;
        session.last_activity_at = Utc::now();
        session.has_active_draft_order = false;
        self.inner.store.upsert(session).await;
        cell.advance();

        info!(
            event_name = "session.completed",
            customer_id = %key.customer_id.0,
            branch_id = %key.branch_id.0,
            "order confirmed, session completed"
        );
        Ok(())
    }

    /// Records the externally owned draft the conversation is about.
    pub async fn attach_draft_order(
        &self,
        key: &ConversationKey,
        order_ref: OrderRef,
    ) -> Result<(), EngineError> {
        let cell = self.inner.cell(key).await;
        let _guard = cell.guard.lock().await;

        let Some(mut session) = self.inner.store.get(key).await else {
            return Err(EngineError::NotFound);
        };
        if session.is_terminal() {
            return Err(EngineError::NotFound);
        }

        session.has_active_draft_order = true;
        session.active_order_ref = Some(order_ref);
        self.inner.store.upsert(session).await;
        Ok(())
    }

    /// Detaches the active draft (customer-initiated cancel) and hands the
    /// reference back so the caller can void it with the order store.
    pub async fn release_draft_order(
        &self,
        key: &ConversationKey,
    ) -> Result<Option<OrderRef>, EngineError> {
        let cell = self.inner.cell(key).await;
        let _guard = cell.guard.lock().await;

        let Some(mut session) = self.inner.store.get(key).await else {
            return Err(EngineError::NotFound);
        };

        let released = session.active_order_ref.take();
        session.has_active_draft_order = false;
        self.inner.store.upsert(session).await;
        Ok(released)
    }

    pub async fn session(&self, key: &ConversationKey) -> Option<ConversationSession> {
        self.inner.store.get(key).await
    }

    /// Restart recovery: sweeps every non-terminal session whose last
    /// activity predates `now` by more than T1+T2 straight to `Canceled`,
    /// voiding any attached draft. Stale conversations get no
    /// customer-facing notice; the sweep is logged instead.
    pub async fn recover(&self, now: DateTime<Utc>) -> usize {
        let cutoff = self.inner.config.stale_cutoff();
        let mut swept = 0;

        for candidate in self.inner.store.non_terminal().await {
            let cell = self.inner.cell(&candidate.key).await;
            let _guard = cell.guard.lock().await;

            let Some(mut session) = self.inner.store.get(&candidate.key).await else {
                continue;
            };
            if session.is_terminal() || now - session.last_activity_at <= cutoff {
                continue;
            }

            session.state = SessionState::Canceled;
            session.has_active_draft_order = false;
            let released = session.active_order_ref.clone();
            self.inner.store.upsert(session).await;
            cell.advance();

            if let Some(order_ref) = released {
                if let Err(error) = self.inner.orders.void_order(&order_ref).await {
                    warn!(
                        event_name = "session.recovery_void_failed",
                        customer_id = %candidate.key.customer_id.0,
                        branch_id = %candidate.key.branch_id.0,
                        error = %error,
                        "could not void draft order during recovery"
                    );
                }
            }

            info!(
                event_name = "session.recovered_cancel",
                customer_id = %candidate.key.customer_id.0,
                branch_id = %candidate.key.branch_id.0,
                "stale session swept to canceled during recovery"
            );
            swept += 1;
        }

        swept
    }

    async fn apply_activity(
        &self,
        key: &ConversationKey,
        event: SessionEvent,
    ) -> Result<(), EngineError> {
        let cell = self.inner.cell(key).await;
        let _guard = cell.guard.lock().await;

        let Some(mut session) = self.inner.store.get(key).await else {
            return Err(EngineError::NotFound);
        };
        if session.is_terminal() {
            return Err(EngineError::NotFound);
        }

        let outcome = transition(&session.state, &event)?;
        session.state = outcome.to;
        session.touch(Utc::now());
        self.inner.store.upsert(session).await;

        let generation = cell.advance();
        if outcome.actions.contains(&SessionAction::ArmReminderTimer) {
            arm_reminder(&self.inner, key.clone(), generation);
        }
        Ok(())
    }
}

impl LifecycleInner {
    async fn cell(&self, key: &ConversationKey) -> Arc<KeyCell> {
        let mut cells = self.cells.lock().await;
        Arc::clone(cells.entry(key.clone()).or_default())
    }
}

/// Arming never blocks the caller; the sleep lives on its own task.
fn arm_reminder(inner: &Arc<LifecycleInner>, key: ConversationKey, generation: u64) {
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        tokio::time::sleep(inner.config.reminder_after).await;
        reminder_elapsed(&inner, &key, generation).await;
    });
}

fn arm_cancellation(inner: &Arc<LifecycleInner>, key: ConversationKey, generation: u64) {
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        tokio::time::sleep(inner.config.cancel_after).await;
        cancellation_elapsed(&inner, &key, generation).await;
    });
}

async fn reminder_elapsed(inner: &Arc<LifecycleInner>, key: &ConversationKey, generation: u64) {
    let cell = inner.cell(key).await;
    let _guard = cell.guard.lock().await;
    if !cell.is_current(generation) {
        debug!(
            event_name = "session.timer_stale",
            customer_id = %key.customer_id.0,
            branch_id = %key.branch_id.0,
            "reminder timer superseded by fresh activity"
        );
        return;
    }

    let Some(mut session) = inner.store.get(key).await else {
        return;
    };
    let Ok(outcome) = transition(&session.state, &SessionEvent::ReminderElapsed) else {
        return;
    };

    let now = Utc::now();
    session.state = outcome.to;
    session.reminder_sent_at = Some(now);
    session.last_activity_at = now;
    inner.store.upsert(session).await;

    let next_generation = cell.advance();
    arm_cancellation(inner, key.clone(), next_generation);

    // Delivery is best-effort; the transition above stands either way.
    if let Err(error) = inner.notifier.send(&key.branch_id, &key.customer_id, REMINDER_TEXT).await
    {
        warn!(
            event_name = "session.reminder_send_failed",
            customer_id = %key.customer_id.0,
            branch_id = %key.branch_id.0,
            error = %error,
            "reminder notification failed"
        );
    } else {
        info!(
            event_name = "session.reminder_sent",
            customer_id = %key.customer_id.0,
            branch_id = %key.branch_id.0,
            "inactivity reminder sent"
        );
    }
}

async fn cancellation_elapsed(inner: &Arc<LifecycleInner>, key: &ConversationKey, generation: u64) {
    let cell = inner.cell(key).await;
    let _guard = cell.guard.lock().await;
    if !cell.is_current(generation) {
        debug!(
            event_name = "session.timer_stale",
            customer_id = %key.customer_id.0,
            branch_id = %key.branch_id.0,
            "cancellation timer superseded by fresh activity"
        );
        return;
    }

    let Some(mut session) = inner.store.get(key).await else {
        return;
    };
    let Ok(outcome) = transition(&session.state, &SessionEvent::CancellationElapsed) else {
        return;
    };

    session.state = outcome.to;
    session.has_active_draft_order = false;
    let released = session.active_order_ref.clone();
    inner.store.upsert(session).await;
    cell.advance();

    if outcome.actions.contains(&SessionAction::ReleaseDraftOrder) {
        if let Some(order_ref) = released {
            if let Err(error) = inner.orders.void_order(&order_ref).await {
                warn!(
                    event_name = "session.order_void_failed",
                    customer_id = %key.customer_id.0,
                    branch_id = %key.branch_id.0,
                    error = %error,
                    "could not void draft order on timeout"
                );
            }
        }
    }

    if let Err(error) =
        inner.notifier.send(&key.branch_id, &key.customer_id, CANCELLATION_TEXT).await
    {
        warn!(
            event_name = "session.cancellation_send_failed",
            customer_id = %key.customer_id.0,
            branch_id = %key.branch_id.0,
            error = %error,
            "cancellation notice failed"
        );
    } else {
        info!(
            event_name = "session.canceled",
            customer_id = %key.customer_id.0,
            branch_id = %key.branch_id.0,
            "session canceled after inactivity cascade"
        );
    }
}
