//! Serve command: run the REST API until Ctrl-C / SIGTERM

use anyhow::{anyhow, Result};
use tracing::info;

use donow::config::Config;
use donow::server::{ApiServer, AppState};

pub async fn serve_command(mut config: Config, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let store = super::open_store(&config)?;
    let addr = config.server.bind_addr();
    let server = ApiServer::bind(&addr, AppState::new(store, config))?;
    let (handle, join) = server.spawn();

    shutdown_signal().await;
    info!("[donow:http] Shutting down");
    handle.shutdown();

    tokio::task::spawn_blocking(move || join.join())
        .await?
        .map_err(|_| anyhow!("Server thread panicked"))?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
