//! Shared state for the chime server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::hub::Hub;

/// State shared by every request handler.
///
/// The config and pack surfaces are plain filesystem paths — they share the
/// router with the hub but none of its mutable state.
#[derive(Debug)]
pub struct AppState {
    hub: Arc<Hub>,
    config_path: PathBuf,
    packs_dir: PathBuf,
    assets_dir: PathBuf,
}

impl AppState {
    /// Create server state rooted at the given paths.
    pub fn new(
        config_path: impl Into<PathBuf>,
        packs_dir: impl Into<PathBuf>,
        assets_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            hub: Arc::new(Hub::new()),
            config_path: config_path.into(),
            packs_dir: packs_dir.into(),
            assets_dir: assets_dir.into(),
        }
    }

    /// The broadcast hub.
    #[must_use]
    pub fn hub(&self) -> Arc<Hub> {
        Arc::clone(&self.hub)
    }

    /// Location of the persisted configuration file.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Directory containing installed sound packs.
    #[must_use]
    pub fn packs_dir(&self) -> &Path {
        &self.packs_dir
    }

    /// Directory containing the static browser UI.
    #[must_use]
    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }
}
