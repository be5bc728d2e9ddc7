use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use keeweb_api::{build_router, AppState};
use keeweb_core::FileDatabaseLoader;
use keeweb_session::{spawn_sweeper, SessionStore};
use keeweb_shared::{telemetry, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry; the guard flushes the log file on drop
    let _log_guard = telemetry::init_telemetry(&config.log);

    info!("{} starting...", config.app.name);

    // Sessions
    let sessions = Arc::new(SessionStore::new(config.session.lifetime()));
    let sweeper = spawn_sweeper(sessions.clone(), config.session.sweep_interval());
    match config.session.lifetime() {
        Some(lifetime) => info!("Session lifetime: {}s", lifetime.as_secs()),
        None => info!("Session expiry disabled"),
    }

    // Databases
    let loader = FileDatabaseLoader::new(&config.database.directory);
    info!("Serving databases from {}", loader.directory().display());

    // Create App State
    let state = AppState::builder()
        .config(config.clone())
        .sessions(sessions)
        .loader(Arc::new(loader))
        .build()?;

    // Build router
    let app = build_router(&state)?;

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
