//! Backend for a personal site.
//!
//! Serves the site's static files and three small JSON resources:
//! a list of activities, upcoming Google calendar events, and a
//! Project Euler problem of the day scraped from projecteuler.net.

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

pub mod activity;
pub mod calendar;
pub mod config;
pub mod error;
pub mod euler;
pub mod routes;
pub mod site;
pub mod state;
pub mod storage;

use config::Config;
use state::AppState;

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("personal_site=info,tower_http=info"));

    fmt().with_env_filter(filter).with_target(false).init();
}

pub async fn start_server(config: Config) -> Result<()> {
    info!("Initializing state...");
    let state = AppState::new(&config).await?;

    let app = routes::router(state, &config.static_dir);

    info!("Binding to {}", config.listen);
    let listener = TcpListener::bind(config.listen).await?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
