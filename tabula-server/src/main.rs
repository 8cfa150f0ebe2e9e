use std::sync::Arc;
use tabula_core::{DatabaseConfig, ServerConfig};
use tabula_pg::PgBackend;
use tabula_query::Engine;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let db_config = DatabaseConfig::from_env();
    let server_config = ServerConfig::from_env();

    info!(host = %db_config.host, dbname = %db_config.dbname, "connecting to postgres");
    let backend = PgBackend::connect(&db_config).await?;
    let engine = Arc::new(Engine::new(backend));

    let app = tabula_server::router(engine);
    let addr = format!("{}:{}", server_config.bind_address, server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
