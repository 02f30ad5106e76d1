use dotenv::dotenv;
use salvo::conn::tcp::TcpAcceptor;
use salvo::prelude::*;
use std::time::Duration;
use tokio::signal;

use crud_gateway::{api, AppState, Config};

/// Bind to address, retrying while a previous process still holds the port
async fn bind_with_retry(address: &str, max_retries: u32) -> anyhow::Result<TcpAcceptor> {
    let socket_addr: std::net::SocketAddr = address
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address format {}: {}", address, e))?;

    for attempt in 1..=max_retries {
        // Probe with a plain listener so an in-use port can be retried
        match tokio::net::TcpListener::bind(socket_addr).await {
            Ok(probe) => {
                drop(probe);
                tracing::info!("🔗 Binding to {} (attempt {})", address, attempt);
                return Ok(TcpListener::new(address).bind().await);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse && attempt < max_retries => {
                tracing::warn!(
                    "⚠️  Port {} is in use (attempt {}/{}), retrying in 1 second...",
                    socket_addr.port(),
                    attempt,
                    max_retries
                );
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(e) => return Err(anyhow::anyhow!("Failed to bind to {}: {}", address, e)),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind to {} after {} attempts",
        address,
        max_retries
    ))
}

/// Wait for shutdown signal (SIGTERM, SIGINT, or Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("crud_gateway=info".parse()?)
                .add_directive("salvo=info".parse()?)
                .add_directive("tiberius=warn".parse()?)
                .add_directive("mongodb=warn".parse()?),
        )
        .init();

    tracing::info!("Application startup: initializing resources...");
    let config = Config::from_env()?;
    let state = AppState::new(&config);

    let router = api::router(state.clone());
    let acceptor = bind_with_retry(&config.server_address, 5).await?;
    tracing::info!("🚀 CRUD gateway listening on {}", config.server_address);

    let server = Server::new(acceptor);
    tokio::select! {
        _ = server.serve(Service::new(router)) => {
            tracing::info!("🛑 Server stopped");
        }
        _ = shutdown_signal() => {
            tracing::info!("🛑 Application shutdown: releasing resources...");
        }
    }

    state.shutdown().await;
    Ok(())
}
