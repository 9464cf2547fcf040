//! The `chime serve` command: config, watcher, and server wired together.

use std::net::SocketAddr;

use chime_config::Config;
use chime_server::{ChimeServer, ServerConfig, EVENT_QUEUE_CAPACITY};
use chime_sessions::SessionWatcher;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cli::ServeArgs;
use crate::error::CliError;

/// Run the server until Ctrl-C or a fatal error.
///
/// Command-line flags override the config file, which overrides defaults.
/// The session watcher and the HTTP server share one cancellation token:
/// Ctrl-C, a bind failure, or a watcher-init failure each cancel it, and
/// every task unwinds from its next suspension point.
pub async fn run(args: &ServeArgs) -> Result<(), CliError> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(chime_config::default_path);
    let config = Config::load(&config_path)?;

    let port = args.port.unwrap_or(config.port);
    let watch_root =
        chime_config::expand_tilde(args.watch_path.as_deref().unwrap_or(&config.watch_path));

    // Loopback only: chime is a local tool with no authentication.
    let bind_addr = SocketAddr::from(([127, 0, 0, 1], port));
    let server_config = ServerConfig::new(bind_addr)
        .with_config_path(config_path)
        .with_assets_dir(args.assets.clone());

    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let cancel = CancellationToken::new();

    info!(root = %watch_root.display(), "starting session watcher");
    let watcher = SessionWatcher::new(watch_root, events_tx, cancel.clone());
    let watcher_cancel = cancel.clone();
    let watcher_task = tokio::spawn(async move {
        let result = watcher.run().await;
        if let Err(e) = &result {
            error!(error = %e, "session watcher failed");
            // Without the watcher there is nothing to stream; take the
            // server down too.
            watcher_cancel.cancel();
        }
        result
    });

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutting down");
            ctrl_c_cancel.cancel();
        }
    });

    println!("chime listening on http://localhost:{port}");
    let server = ChimeServer::new(server_config, events_rx);
    let served = server.serve(cancel.clone()).await;

    // Make sure the watcher and every tailer unwind before reporting.
    cancel.cancel();
    let watched = watcher_task.await;

    served?;
    if let Ok(result) = watched {
        result?;
    }
    Ok(())
}
