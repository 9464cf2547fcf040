//! CLI error type.

use thiserror::Error;

/// Errors surfaced by the chime CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or saved.
    #[error(transparent)]
    Config(#[from] chime_config::ConfigError),

    /// The server failed to start or run.
    #[error(transparent)]
    Server(#[from] chime_server::ServerError),

    /// The session watcher failed to start.
    #[error(transparent)]
    Watch(#[from] chime_sessions::WatchError),

    /// Pack metadata could not be read.
    #[error(transparent)]
    Packs(#[from] chime_packs::PackError),

    /// The requested pack is not in the download registry.
    #[error("unknown pack: {name} (available: {available})")]
    UnknownPack {
        /// Slug the user asked for.
        name: String,
        /// Comma-separated registry slugs.
        available: String,
    },

    /// A sound file download failed.
    #[error("download {url}: {reason}")]
    Download {
        /// URL being fetched.
        url: String,
        /// Why it failed.
        reason: String,
    },

    /// Filesystem error while installing a pack.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
