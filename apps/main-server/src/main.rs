//! StudyHub Server binary.

use std::net::SocketAddr;

use study_store::MemoryStudyStore;
use studyhub_server::{config::Config, create_app, create_state, init_tracing, services::seed_zones};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    tracing::info!(
        jwt_expiration_hours = config.jwt_expiration_hours,
        "Starting StudyHub Server"
    );

    let store = MemoryStudyStore::new();

    if let Some(path) = &config.zones_file {
        seed_zones(&store, path).await?;
    }

    let state = create_state(config.clone(), store);
    let app = create_app(state);

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
