use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod app;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mentora_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit MENTORA_CONFIG path > ~/.mentora/mentora.toml
    let config_path = std::env::var("MENTORA_CONFIG").ok();
    let config = mentora_core::config::MentoraConfig::load(config_path.as_deref())
        .unwrap_or_else(|e| {
            tracing::warn!("Config load failed ({}), using defaults", e);
            mentora_core::config::MentoraConfig::default()
        });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    let state = Arc::new(app::AppState::new(config));

    // In-process listener: activity events also land in the server log, so
    // conversation activity is observable without any client streaming.
    state
        .bus
        .subscribe(mentora_core::EventType::ActivityLogCreated, |event| {
            info!(room = %event.room, "activity recorded");
            Ok(())
        });

    let router = app::build_router(Arc::clone(&state));

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Mentora gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
