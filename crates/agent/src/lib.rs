pub mod collaborators;
pub mod demo;
pub mod lifecycle;
pub mod router;
pub mod store;

pub use collaborators::{
    CatalogProvider, InMemoryCatalogProvider, InMemoryOrderStore, NotificationSender, OrderStore,
    RecordingNotificationSender, SentMessage,
};
pub use demo::{demo_catalog_text, demo_deployment, DemoDeployment};
pub use lifecycle::{LifecycleConfig, SessionLifecycleManager};
pub use router::{MessageRouter, ReplyKind, RouterConfig, RouterReply};
pub use store::{FunnelStore, InMemoryFunnelStore, InMemorySessionStore, SessionStore};
