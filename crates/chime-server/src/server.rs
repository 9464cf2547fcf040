//! The chime server: wires the hub and HTTP surface together.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use chime_events::ChimeEvent;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::{ServerError, ServerResult};
use crate::routes::create_router;
use crate::state::AppState;

/// Capacity of the bounded event-ingress channel between the tailers and
/// the hub. Producers block when it fills, which propagates backpressure
/// all the way to file reading.
pub const EVENT_QUEUE_CAPACITY: usize = 100;

/// Configuration for the chime server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to.
    pub bind_addr: SocketAddr,
    /// Location of the persisted configuration file.
    pub config_path: PathBuf,
    /// Directory containing installed sound packs.
    pub packs_dir: PathBuf,
    /// Directory containing the static browser UI.
    pub assets_dir: PathBuf,
}

impl ServerConfig {
    /// Create a configuration with the default chime paths.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            config_path: chime_config::default_path(),
            packs_dir: chime_config::default_packs_dir(),
            assets_dir: PathBuf::from("web"),
        }
    }

    /// Set the configuration file location.
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Set the sound pack directory.
    #[must_use]
    pub fn with_packs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.packs_dir = dir.into();
        self
    }

    /// Set the static asset directory.
    #[must_use]
    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = dir.into();
        self
    }
}

/// The chime HTTP server.
///
/// Owns the receiving end of the event-ingress channel; [`serve`] launches
/// the hub's broadcast loop over it and then serves HTTP until shutdown.
///
/// [`serve`]: ChimeServer::serve
pub struct ChimeServer {
    config: ServerConfig,
    state: Arc<AppState>,
    events: mpsc::Receiver<ChimeEvent>,
}

impl ChimeServer {
    /// Create a server from its configuration and the event ingress.
    #[must_use]
    pub fn new(config: ServerConfig, events: mpsc::Receiver<ChimeEvent>) -> Self {
        let state = Arc::new(AppState::new(
            config.config_path.clone(),
            config.packs_dir.clone(),
            config.assets_dir.clone(),
        ));
        Self {
            config,
            state,
            events,
        }
    }

    /// The shared request-handler state.
    #[must_use]
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Bind, start the broadcast loop, and serve until `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::BindFailed`] when the listen address is
    /// unavailable — the caller treats that as fatal — and
    /// [`ServerError::Internal`] for serve-loop failures.
    pub async fn serve(self, cancel: CancellationToken) -> ServerResult<()> {
        let listener = TcpListener::bind(self.config.bind_addr)
            .await
            .map_err(|e| ServerError::BindFailed(self.config.bind_addr, e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        info!(addr = %addr, "chime server listening");

        // Broadcast loop: ends by itself once every event sender is gone,
        // which the shutdown token guarantees during teardown.
        let hub = self.state.hub();
        let events = self.events;
        tokio::spawn(async move { hub.run(events).await });

        let router = create_router(Arc::clone(&self.state));
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        info!("chime server shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn make_config(dir: &TempDir, addr: SocketAddr) -> ServerConfig {
        ServerConfig::new(addr)
            .with_config_path(dir.path().join("config.json"))
            .with_packs_dir(dir.path().join("packs"))
            .with_assets_dir(dir.path().join("web"))
    }

    #[test]
    fn test_config_builder() {
        let addr: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let config = ServerConfig::new(addr)
            .with_config_path("/tmp/c.json")
            .with_packs_dir("/tmp/packs")
            .with_assets_dir("/tmp/web");

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.config_path, PathBuf::from("/tmp/c.json"));
        assert_eq!(config.packs_dir, PathBuf::from("/tmp/packs"));
        assert_eq!(config.assets_dir, PathBuf::from("/tmp/web"));
    }

    #[tokio::test]
    async fn test_serve_shuts_down_on_cancel() {
        let dir = TempDir::new().unwrap();
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let (_tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let server = ChimeServer::new(make_config(&dir, addr), rx);

        let cancel = CancellationToken::new();
        let serve_cancel = cancel.clone();
        let handle = tokio::spawn(async move { server.serve(serve_cancel).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("server should stop after cancel")
            .expect("serve task should not panic");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_serve_reports_bind_failure() {
        let dir = TempDir::new().unwrap();

        // Occupy a port, then try to bind the server to the same one.
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();

        let (_tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let server = ChimeServer::new(make_config(&dir, addr), rx);

        let result = server.serve(CancellationToken::new()).await;
        assert!(matches!(result, Err(ServerError::BindFailed(_, _))));
    }
}
