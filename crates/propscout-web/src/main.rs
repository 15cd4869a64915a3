//! PropScout server entry point.

use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use propscout_config::ScoutConfig;
use propscout_web::router::build_router;
use propscout_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::var("PROPSCOUT_CONFIG").unwrap_or_else(|_| "propscout.toml".into());
    let cfg = ScoutConfig::load(Some(Path::new(&config_path)))?;
    info!(
        bind = %cfg.server.bind_addr,
        store = if cfg.database.url.is_some() { "postgres" } else { "memory" },
        "starting propscout"
    );

    let state = AppState::from_config(&cfg).await?;
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
