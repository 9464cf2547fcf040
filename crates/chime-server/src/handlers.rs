//! HTTP handlers for the configuration and sound pack endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chime_config::{Config, ConfigUpdate};
use chime_packs::Pack;
use tracing::warn;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Handle `GET /api/config`.
///
/// Loads the persisted config, falling back to defaults when the file does
/// not exist yet.
pub async fn get_config(State(state): State<Arc<AppState>>) -> ServerResult<Json<Config>> {
    let config = Config::load(state.config_path()).map_err(|e| {
        warn!(path = %state.config_path().display(), error = %e, "cannot load config");
        ServerError::Internal("failed to load config".to_string())
    })?;

    Ok(Json(config))
}

/// Handle `PUT /api/config`.
///
/// Merges the update over the stored config, persists it, and echoes the
/// result. Unknown fields in the body are rejected.
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> ServerResult<Json<Config>> {
    let update: ConfigUpdate = serde_json::from_value(body)
        .map_err(|e| ServerError::InvalidRequest(format!("invalid request body: {e}")))?;

    let mut config = Config::load(state.config_path()).map_err(|e| {
        warn!(path = %state.config_path().display(), error = %e, "cannot load config for update");
        ServerError::Internal("failed to load config".to_string())
    })?;

    update.apply(&mut config);

    config.save(state.config_path()).map_err(|e| {
        warn!(path = %state.config_path().display(), error = %e, "cannot save config");
        ServerError::Internal("failed to save config".to_string())
    })?;

    Ok(Json(config))
}

/// Handle `GET /api/packs`.
///
/// Lists every loadable pack under the packs directory. The response is an
/// empty array (never null) when nothing is installed.
pub async fn list_packs(State(state): State<Arc<AppState>>) -> ServerResult<Json<Vec<Pack>>> {
    let packs = chime_packs::list_packs(state.packs_dir()).map_err(|e| {
        warn!(path = %state.packs_dir().display(), error = %e, "cannot list packs");
        ServerError::Internal("failed to list packs".to_string())
    })?;

    Ok(Json(packs))
}

/// Handle `GET /api/packs/{name}/manifest`.
///
/// Names containing path separators are rejected so callers cannot
/// traverse outside the packs directory.
pub async fn get_pack_manifest(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ServerResult<Json<Pack>> {
    if name.is_empty() {
        return Err(ServerError::InvalidRequest("missing pack name".to_string()));
    }
    if name.contains(['/', '\\']) {
        return Err(ServerError::InvalidRequest("invalid pack name".to_string()));
    }

    let pack_dir = state.packs_dir().join(&name);
    let pack = Pack::load(&pack_dir).map_err(|e| {
        warn!(path = %pack_dir.display(), error = %e, "cannot load pack");
        ServerError::NotFound("pack".to_string(), name)
    })?;

    Ok(Json(pack))
}
