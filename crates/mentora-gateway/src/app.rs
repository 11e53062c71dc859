use axum::{routing::get, Router};
use mentora_bus::EventBus;
use mentora_core::config::MentoraConfig;
use mentora_realtime::{Broadcaster, ConnectionRegistry};
use std::sync::Arc;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
///
/// The bus and registry are built exactly once here (composition root) and
/// live for the whole process; nothing tears them down during normal
/// operation.
pub struct AppState {
    pub config: MentoraConfig,
    pub bus: Arc<EventBus>,
    pub broadcaster: Broadcaster,
}

impl AppState {
    pub fn new(config: MentoraConfig) -> Self {
        let bus = Arc::new(EventBus::new());
        let registry = Arc::new(ConnectionRegistry::new(Arc::clone(&bus)));
        let broadcaster = Broadcaster::new(Arc::clone(&bus), registry);
        Self {
            config,
            bus,
            broadcaster,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/rooms/{room}/stream",
            get(crate::http::stream::stream_handler),
        )
        .route("/presence", get(crate::http::presence::presence_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
