//! Message Router: the thin boundary that feeds every inbound message to
//! the lifecycle manager first, then dispatches it by priority to the
//! active funnel, a recognized command, the product matcher, or the
//! fallback responder.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use ordena_core::funnel::{render_question, FunnelEngine, FunnelReply};
use ordena_core::matching::extract_order;
use ordena_core::{
    classify_command, CatalogSnapshot, CommandKind, ConversationKey, EngineError, OrderDraft,
    RecommendationSet,
};

use crate::collaborators::{CatalogProvider, OrderStore};
use crate::lifecycle::SessionLifecycleManager;
use crate::store::FunnelStore;

#[derive(Clone, Debug)]
pub struct RouterConfig {
    pub delivery_fee: Decimal,
    pub branch_hours: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyKind {
    Greeting,
    Menu,
    Question,
    Recommendation,
    OrderSummary,
    Confirmation,
    Cancellation,
    Hours,
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouterReply {
    pub kind: ReplyKind,
    pub text: String,
}

impl RouterReply {
    fn new(kind: ReplyKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

pub struct MessageRouter {
    lifecycle: SessionLifecycleManager,
    funnels: Arc<dyn FunnelStore>,
    catalog: Arc<dyn CatalogProvider>,
    orders: Arc<dyn OrderStore>,
    engine: FunnelEngine,
    config: RouterConfig,
}

impl MessageRouter {
    pub fn new(
        lifecycle: SessionLifecycleManager,
        funnels: Arc<dyn FunnelStore>,
        catalog: Arc<dyn CatalogProvider>,
        orders: Arc<dyn OrderStore>,
        config: RouterConfig,
    ) -> Self {
        Self { lifecycle, funnels, catalog, orders, engine: FunnelEngine::new(), config }
    }

    pub fn lifecycle(&self) -> &SessionLifecycleManager {
        &self.lifecycle
    }

    /// Handles one inbound customer message and produces the reply text the
    /// transport should deliver.
    pub async fn handle_message(&self, key: &ConversationKey, text: &str) -> RouterReply {
        let command = classify_command(text);

        // The lifecycle manager sees every message before any content
        // handler; a missing or terminal session means "start fresh".
        match command {
            CommandKind::Greeting => self.lifecycle.on_greeting(key).await,
            _ => {
                if self.lifecycle.on_inbound_message(key).await == Err(EngineError::NotFound) {
                    self.lifecycle.on_greeting(key).await;
                }
            }
        }

        // An active interview owns message interpretation for its key.
        if let Some(funnel) = self.funnels.get(key).await.filter(|funnel| funnel.is_active()) {
            return self.handle_funnel_answer(key, funnel, text).await;
        }

        self.dispatch_command(key, command, text).await
    }

    async fn handle_funnel_answer(
        &self,
        key: &ConversationKey,
        mut funnel: ordena_core::FunnelSession,
        text: &str,
    ) -> RouterReply {
        let catalog = self.catalog_for(key).await;

        match self.engine.answer(&mut funnel, text, &catalog) {
            Ok(FunnelReply::Question { text, .. }) => {
                self.funnels.upsert(funnel).await;
                RouterReply::new(ReplyKind::Question, text)
            }
            Ok(FunnelReply::Canceled) => {
                self.funnels.upsert(funnel).await;
                RouterReply::new(
                    ReplyKind::Cancellation,
                    "Listo, dejamos la recomendación para otro momento. ¿En qué más te ayudo?",
                )
            }
            Ok(FunnelReply::Escape { command }) => {
                self.funnels.upsert(funnel).await;
                self.dispatch_command(key, command, text).await
            }
            Ok(FunnelReply::Completed { result }) => {
                self.funnels.upsert(funnel).await;
                RouterReply::new(ReplyKind::Recommendation, render_recommendation(&result))
            }
            Err(EngineError::InvalidInput { step }) => {
                let text = render_question(step)
                    .unwrap_or_else(|| "Responde con el número de tu opción.".to_string());
                RouterReply::new(
                    ReplyKind::Question,
                    format!("No entendí esa opción.\n{text}"),
                )
            }
            Err(error @ (EngineError::CatalogUnavailable | EngineError::NoMatch)) => {
                self.funnels.upsert(funnel).await;
                debug!(
                    event_name = "funnel.fallback",
                    customer_id = %key.customer_id.0,
                    branch_id = %key.branch_id.0,
                    error = %error,
                    "interview could not produce a recommendation"
                );
                let fallback = if catalog.is_empty() {
                    "Por ahora no tenemos carta disponible, inténtalo más tarde.".to_string()
                } else {
                    format!(
                        "No encontré algo que encaje con tus respuestas. Esta es nuestra carta:\n{}",
                        render_catalog(&catalog)
                    )
                };
                RouterReply::new(ReplyKind::Fallback, fallback)
            }
            Err(_) => {
                RouterReply::new(ReplyKind::Fallback, "Algo salió mal, intenta de nuevo.")
            }
        }
    }

    async fn dispatch_command(
        &self,
        key: &ConversationKey,
        command: CommandKind,
        text: &str,
    ) -> RouterReply {
        match command {
            CommandKind::Greeting => RouterReply::new(
                ReplyKind::Greeting,
                "¡Hola! Escribe tu pedido, pide el *menú*, o dime *recomiéndame* para ayudarte a elegir.",
            ),
            CommandKind::MenuRequest => {
                let _ = self.lifecycle.on_menu_requested(key).await;
                let catalog = self.catalog_for(key).await;
                if catalog.is_empty() {
                    RouterReply::new(
                        ReplyKind::Fallback,
                        "Por ahora no tenemos carta disponible, inténtalo más tarde.",
                    )
                } else {
                    RouterReply::new(ReplyKind::Menu, render_catalog(&catalog))
                }
            }
            CommandKind::RecommendationTrigger { party_size } => {
                self.start_funnel(key, party_size).await
            }
            CommandKind::Confirm => self.confirm_order(key).await,
            CommandKind::Cancel => self.cancel_order(key).await,
            CommandKind::HoursRequest => RouterReply::new(
                ReplyKind::Hours,
                format!("Nuestro horario de atención: {}.", self.config.branch_hours),
            ),
            CommandKind::None => self.try_extract_order(key, text).await,
        }
    }

    async fn start_funnel(&self, key: &ConversationKey, party_size: Option<u32>) -> RouterReply {
        match self.try_start_funnel(key, party_size).await {
            Ok(text) => RouterReply::new(ReplyKind::Question, text),
            Err(EngineError::AlreadyActive) => {
                // Never overwrite a running interview; re-prompt its open
                // question instead.
                let step = self
                    .funnels
                    .get(key)
                    .await
                    .map(|funnel| funnel.current_step)
                    .unwrap_or(1);
                let text = render_question(step)
                    .unwrap_or_else(|| "Responde con el número de tu opción.".to_string());
                RouterReply::new(ReplyKind::Question, text)
            }
            Err(_) => RouterReply::new(ReplyKind::Fallback, "Intenta de nuevo."),
        }
    }

    async fn try_start_funnel(
        &self,
        key: &ConversationKey,
        party_size: Option<u32>,
    ) -> Result<String, EngineError> {
        if let Some(existing) = self.funnels.get(key).await {
            if existing.is_active() {
                return Err(EngineError::AlreadyActive);
            }
        }

        let (session, reply) = self.engine.start(key.clone(), party_size);
        self.funnels.upsert(session).await;
        match reply {
            FunnelReply::Question { text, .. } => Ok(text),
            _ => Err(EngineError::NotFound),
        }
    }

    async fn confirm_order(&self, key: &ConversationKey) -> RouterReply {
        let Some(session) = self.lifecycle.session(key).await else {
            return RouterReply::new(
                ReplyKind::Fallback,
                "No tienes un pedido pendiente por confirmar.",
            );
        };

        if !session.has_active_draft_order {
            return RouterReply::new(
                ReplyKind::Fallback,
                "No tienes un pedido pendiente por confirmar.",
            );
        }

        match self.lifecycle.on_order_confirmed(key).await {
            Ok(()) => RouterReply::new(
                ReplyKind::Confirmation,
                "¡Pedido confirmado! Te avisamos cuando esté en camino. Gracias por tu compra.",
            ),
            Err(error) => {
                warn!(
                    event_name = "router.confirm_failed",
                    customer_id = %key.customer_id.0,
                    branch_id = %key.branch_id.0,
                    error = %error,
                    "confirmation rejected"
                );
                RouterReply::new(
                    ReplyKind::Fallback,
                    "No pude confirmar tu pedido, inténtalo de nuevo.",
                )
            }
        }
    }

    async fn cancel_order(&self, key: &ConversationKey) -> RouterReply {
        match self.lifecycle.release_draft_order(key).await {
            Ok(Some(order_ref)) => {
                if let Err(error) = self.orders.void_order(&order_ref).await {
                    warn!(
                        event_name = "router.cancel_void_failed",
                        customer_id = %key.customer_id.0,
                        branch_id = %key.branch_id.0,
                        error = %error,
                        "could not void draft order on customer cancel"
                    );
                }
                RouterReply::new(
                    ReplyKind::Cancellation,
                    "Tu pedido fue cancelado. ¿Quieres ordenar algo más?",
                )
            }
            Ok(None) => RouterReply::new(
                ReplyKind::Cancellation,
                "No había ningún pedido activo. ¿Te muestro el menú?",
            ),
            Err(_) => RouterReply::new(
                ReplyKind::Cancellation,
                "No había ningún pedido activo. ¿Te muestro el menú?",
            ),
        }
    }

    async fn try_extract_order(&self, key: &ConversationKey, text: &str) -> RouterReply {
        let catalog = self.catalog_for(key).await;
        if catalog.is_empty() {
            return RouterReply::new(
                ReplyKind::Fallback,
                "Por ahora no tenemos carta disponible, inténtalo más tarde.",
            );
        }

        let draft = extract_order(text, &catalog, self.config.delivery_fee);
        if draft.is_empty() {
            return RouterReply::new(
                ReplyKind::Fallback,
                "No logré identificar productos en tu mensaje. Escribe *menú* para ver la carta o *recomiéndame* para una sugerencia.",
            );
        }

        match self.orders.create_draft(key, &draft).await {
            Ok(order_ref) => {
                if let Err(error) = self.lifecycle.attach_draft_order(key, order_ref).await {
                    warn!(
                        event_name = "router.attach_draft_failed",
                        customer_id = %key.customer_id.0,
                        branch_id = %key.branch_id.0,
                        error = %error,
                        "draft created but could not be attached to the session"
                    );
                }
                RouterReply::new(ReplyKind::OrderSummary, render_draft(&draft))
            }
            Err(error) => {
                warn!(
                    event_name = "router.create_draft_failed",
                    customer_id = %key.customer_id.0,
                    branch_id = %key.branch_id.0,
                    error = %error,
                    "order store rejected the draft"
                );
                RouterReply::new(
                    ReplyKind::Fallback,
                    "No pude registrar tu pedido, inténtalo de nuevo.",
                )
            }
        }
    }

    async fn catalog_for(&self, key: &ConversationKey) -> CatalogSnapshot {
        match self.catalog.get_catalog(&key.branch_id).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(
                    event_name = "router.catalog_unavailable",
                    customer_id = %key.customer_id.0,
                    branch_id = %key.branch_id.0,
                    error = %error,
                    "catalog provider failed, treating as empty"
                );
                CatalogSnapshot::default()
            }
        }
    }
}

fn render_catalog(catalog: &CatalogSnapshot) -> String {
    let mut text = String::from("Nuestra carta:\n");
    let mut current_category = "";
    for entry in catalog.entries() {
        if entry.category != current_category {
            current_category = &entry.category;
            text.push_str(&format!("\n*{current_category}*\n"));
        }
        text.push_str(&format!("- {} · ${}\n", entry.canonical_name, entry.unit_price));
    }
    text.push_str("\nEscribe tu pedido, por ejemplo: \"quiero 2 cappuccino\".");
    text
}

fn render_draft(draft: &OrderDraft) -> String {
    let mut text = String::from("Tu pedido:\n");
    for line in &draft.lines {
        text.push_str(&format!(
            "- {} x{} · ${}\n",
            line.product_name, line.quantity, line.line_total
        ));
    }
    text.push_str(&format!("Subtotal: ${}\n", draft.subtotal));
    if draft.delivery_fee > Decimal::ZERO {
        text.push_str(&format!("Envío: ${}\n", draft.delivery_fee));
    }
    text.push_str(&format!("Total: ${}\n", draft.total));
    text.push_str("Responde *confirmar* para cerrar tu pedido o *cancelar* para descartarlo.");
    text
}

fn render_recommendation(result: &RecommendationSet) -> String {
    let mut text = format!(
        "Para {} persona(s) te recomiendo: *{}* (${} c/u, ${} total).\n",
        result.party_size, result.main.product_name, result.main.unit_price,
        result.main.total_price
    );
    if !result.alternatives.is_empty() {
        text.push_str("También podrían gustarte:\n");
        for alternative in &result.alternatives {
            text.push_str(&format!(
                "- {} (${} c/u, ${} total)\n",
                alternative.product_name, alternative.unit_price, alternative.total_price
            ));
        }
    }
    text.push_str("Escribe tu pedido cuando quieras ordenar.");
    text
}
