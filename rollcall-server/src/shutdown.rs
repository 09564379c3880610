//! Signal handling for graceful shutdown and config reload.

use crate::config::ConfigLoader;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::Notify;

/// Creates a future that completes when a shutdown signal is received.
///
/// Listens for SIGTERM and SIGINT (Ctrl+C).
pub async fn shutdown_signal() {
    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            _ => {
                tracing::error!("Failed to install signal handlers, falling back to Ctrl+C");
                wait_for_ctrl_c(tokio::signal::ctrl_c()).await;
                return;
            }
        };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
}

/// Wait on a Ctrl+C listener. If it cannot be installed, log and return so
/// shutdown proceeds.
async fn wait_for_ctrl_c(ctrl_c: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = ctrl_c.await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C, shutting down now");
    }
}

/// Spawns a task that listens for SIGHUP and reloads the configuration.
///
/// Only the `auth` section takes effect without a restart; a changed
/// listen address is reported and otherwise ignored.
///
/// Returns a Notify that can be used to signal when shutdown is complete.
pub fn spawn_config_reload_handler(
    state: AppState,
    config_loader: Arc<ConfigLoader>,
    listen_addr: SocketAddr,
) -> Arc<Notify> {
    let shutdown_notify = Arc::new(Notify::new());
    let shutdown_notify_clone = shutdown_notify.clone();

    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(sighup) => sighup,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGHUP handler, config reload disabled");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading configuration");
                    match config_loader.reload() {
                        Ok(loaded_config) => {
                            if loaded_config.server.listen != listen_addr {
                                tracing::warn!(
                                    "server.listen changed to {}; restart to apply",
                                    loaded_config.server.listen
                                );
                            }
                            *state.config.auth.write().await = loaded_config.auth;
                            tracing::info!("Configuration reloaded successfully");
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload configuration: {}", e);
                        }
                    }
                }
                _ = shutdown_notify_clone.notified() => {
                    tracing::debug!("Config reload handler shutting down");
                    break;
                }
            }
        }
    });

    shutdown_notify
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ctrl_c_listener_failure_does_not_hang_shutdown() {
        let failing = async { Err::<(), _>(std::io::Error::other("signal driver unavailable")) };
        let waited =
            tokio::time::timeout(std::time::Duration::from_secs(1), wait_for_ctrl_c(failing)).await;
        assert!(waited.is_ok(), "fallback did not return");
    }
}
