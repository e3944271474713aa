use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use penguin_species_service::{AppConfig, ModelStore, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(?config.listen_addr, model_dir = %config.model_dir.display(), "starting service");

    let store = Arc::new(ModelStore::initialize(&config));
    if !store.is_ready() {
        tracing::warn!("no models available, /pred will answer 503");
    }
    let router = build_router(store);

    let listener = TcpListener::bind(config.listen_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "REST server ready");

    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,hyper=warn,axum::rejection=trace".into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
