use anyhow::Context;
use db::DBService;
use tokio::{net::TcpListener, signal};
use tracing::info;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::Config;
use state::AppState;

/// Open the database, bind the listener and serve until a shutdown signal.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let db = DBService::new(&config.database_url)
        .await
        .context("failed to open database")?;
    let app = routes::router(AppState::new(db));

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server running on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
