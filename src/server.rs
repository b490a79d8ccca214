//! Accept loop: one session task per client connection

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::http::{create_router, AppState, SessionCounters};
use crate::provider;
use crate::session::{Session, SessionConfig};
use crate::transport::WsTransport;

/// Serve clients until SIGINT/SIGTERM
pub async fn run(config: Config) -> Result<()> {
    let session_config = Arc::new(SessionConfig::from_config(&config)?);
    let counters = Arc::new(SessionCounters::default());

    let addr = format!("{}:{}", config.service.bind, config.service.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("{} listening on {}", config.service.name, addr);
    info!("Provider: {}", config.provider.url);

    if let Some(http_port) = config.service.http_port {
        let state = AppState::new(config.service.name.clone(), Arc::clone(&counters));
        spawn_status_api(&config.service.bind, http_port, state).await?;
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let session_config = Arc::clone(&session_config);
                    let counters = Arc::clone(&counters);
                    tokio::spawn(async move {
                        let _active = counters.open();
                        handle_connection(stream, peer, &session_config).await;
                    });
                }
                Err(e) => warn!("Failed to accept connection: {}", e),
            },
            _ = &mut shutdown => {
                info!("Server shutting down...");
                break;
            }
        }
    }

    Ok(())
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, config: &SessionConfig) {
    let client = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => WsTransport::new(ws),
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", peer, e);
            return;
        }
    };

    info!("New client connected from {}", peer);

    // Every client gets its own provider connection
    let provider = match provider::connect(&config.provider.url).await {
        Ok(socket) => Some(socket),
        Err(e) => {
            error!("Failed to connect to provider at {}: {}", config.provider.url, e);
            None
        }
    };

    Session::open(client, provider, config).run().await;
}

async fn spawn_status_api(bind: &str, port: u16, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", bind, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind status API on {}", addr))?;

    info!("Status API listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, create_router(state)).await {
            error!("Status API stopped: {}", e);
        }
    });

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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
}
