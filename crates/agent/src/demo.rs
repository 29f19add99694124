//! Deterministic in-memory deployment used by the CLI simulation and the
//! end-to-end tests.

use std::sync::Arc;

use ordena_core::config::AppConfig;
use ordena_core::BranchId;

use crate::collaborators::{
    InMemoryCatalogProvider, InMemoryOrderStore, RecordingNotificationSender,
};
use crate::lifecycle::{LifecycleConfig, SessionLifecycleManager};
use crate::router::{MessageRouter, RouterConfig};
use crate::store::{InMemoryFunnelStore, InMemorySessionStore};

/// Demo catalog in the published text format.
pub fn demo_catalog_text() -> &'static str {
    "\
bebidas:
Cappuccino - 3.50 | aka capuchino, capu
Latte - 3.20
Jugo de Naranja - 2.80 | aka naranjada
Limonada de Coco - 4.10

panaderia:
Croissant - 2.25 | aka croisant
Empanada de Queso - 1.80 | aka empanada
Torta de Chocolate - 12.00 | aka torta

almuerzo:
Ensalada César - 8.50 | aka cesar
Sandwich de Pollo - 7.20

cena:
Pizza Familiar - 22.00 | aka pizza grande
Hamburguesa Doble - 12.50 | aka burger
Lasagna de Carne - 14.90 | aka lasagna
"
}

pub struct DemoDeployment {
    pub router: MessageRouter,
    pub sessions: Arc<InMemorySessionStore>,
    pub funnels: Arc<InMemoryFunnelStore>,
    pub catalog: Arc<InMemoryCatalogProvider>,
    pub notifier: Arc<RecordingNotificationSender>,
    pub orders: Arc<InMemoryOrderStore>,
}

/// Wires the whole engine against in-memory collaborators and publishes the
/// demo catalog for `branch_id`.
pub async fn demo_deployment(config: &AppConfig, branch_id: &BranchId) -> DemoDeployment {
    let sessions = Arc::new(InMemorySessionStore::new());
    let funnels = Arc::new(InMemoryFunnelStore::new());
    let catalog = Arc::new(InMemoryCatalogProvider::new());
    let notifier = Arc::new(RecordingNotificationSender::new());
    let orders = Arc::new(InMemoryOrderStore::new());

    catalog.publish(branch_id.clone(), demo_catalog_text()).await;

    let lifecycle = SessionLifecycleManager::new(
        sessions.clone(),
        notifier.clone(),
        orders.clone(),
        LifecycleConfig::from_timers(&config.timers),
    );

    let router = MessageRouter::new(
        lifecycle,
        funnels.clone(),
        catalog.clone(),
        orders.clone(),
        RouterConfig {
            delivery_fee: config.branch.delivery_fee,
            branch_hours: config.branch.hours.clone(),
        },
    );

    DemoDeployment { router, sessions, funnels, catalog, notifier, orders }
}
