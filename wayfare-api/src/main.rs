use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wayfare_api::{
    app,
    state::{AppState, AuthConfig, Repositories},
};
use wayfare_catalog::RecommendedCatalog;
use wayfare_store::{app_config::Config, DbClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "wayfare_api=debug,wayfare_itinerary=info,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Wayfare API on port {}", config.server.port);

    let repositories = if config.database.is_memory() {
        tracing::warn!("Using the in-memory store, nothing will be persisted");
        Repositories::in_memory()
    } else {
        let db = DbClient::new(&config.database.url, config.database.max_connections).await?;
        db.migrate().await?;
        Repositories::sqlite(&db)
    };

    let catalog = RecommendedCatalog::builtin()?;
    tracing::info!("Loaded {} recommended trips", catalog.templates().len());

    let app_state = AppState::new(
        repositories,
        Arc::new(catalog),
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
        config.planner.clone(),
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
