mod config;
mod frame;
mod relay;

use config::ProxyConfig;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting spyglass proxy...");

    let config = Arc::new(ProxyConfig::load(Path::new("config/spyglass.toml"))?);
    info!(
        "Config loaded: bind={}:{}, backend={}:{}",
        config.bind, config.port, config.backend, config.backend_port
    );

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    // Graceful shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ctrlc_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received shutdown signal");
        let _ = ctrlc_tx.send(true);
    });

    let mut shutdown = shutdown_rx.clone();
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((socket, peer)) => {
                        info!("New connection from {}", peer);
                        let config = config.clone();
                        let shutdown = shutdown_rx.clone();
                        tokio::spawn(async move {
                            relay::handle_connection(socket, config, shutdown).await;
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                }
            }
            _ = shutdown.changed() => {
                info!("Proxy shut down cleanly");
                break;
            }
        }
    }

    Ok(())
}
