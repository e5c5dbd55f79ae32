use anyhow::{Context, Result};
use clap::Parser;
use docgate::config::ServerConfig;
use docgate::{AppState, StoreConnection, build_router};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ServerConfig::parse();
    let connection_config = config
        .connection_config()
        .context("invalid database configuration")?;
    let connection = StoreConnection::new(connection_config);

    // Serve immediately; requests answer 503 until the store is ready.
    let connecting = connection.clone();
    tokio::spawn(async move {
        if let Err(err) = connecting.connect().await {
            error!(error = %err, "failed to connect to document store");
        }
    });

    let app = build_router(AppState::new(connection.clone()));

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "docgate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if connection.is_ready() {
        connection
            .save_snapshot()
            .await
            .context("failed to write snapshot on shutdown")?;
    } else {
        warn!("store never became ready, skipping snapshot");
    }

    info!("docgate stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("docgate=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
