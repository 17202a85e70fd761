use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use api::{build_router, ApiState};
use common::{config::AppConfig, logging};
use db::pg::PgDatabase;
use db::Repositories;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging("info");
    let config = AppConfig::load()?;
    let database_url = config
        .database
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .context("database.url (DATABASE_URL) must be set")?;
    let database = PgDatabase::connect(database_url).await?;
    let repositories: Arc<dyn Repositories> = Arc::new(database);

    let state = Arc::new(ApiState::new(
        repositories,
        config.observability.metrics_path.clone(),
        &config.api.allowed_origins,
    ));
    let app = build_router(state);

    let addr: SocketAddr = config.api.bind.parse()?;
    info!(%addr, "api listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
