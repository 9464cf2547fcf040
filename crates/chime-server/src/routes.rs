//! Route configuration for the chime server.

use std::sync::Arc;

use axum::routing::{get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::{get_config, get_pack_manifest, list_packs, update_config};
use crate::state::AppState;
use crate::websocket::ws_upgrade;

/// Create the chime router.
///
/// `/ws` carries the event stream; `/api` holds the config and pack
/// surfaces; `/sounds` serves pack audio; everything else falls through to
/// the static UI assets.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/config", get(get_config).put(update_config))
        .route("/packs", get(list_packs))
        .route("/packs/{name}/manifest", get(get_pack_manifest));

    Router::new()
        .route("/ws", get(ws_upgrade))
        .nest("/api", api_routes)
        .nest_service("/sounds", ServeDir::new(state.packs_dir()))
        .fallback_service(ServeDir::new(state.assets_dir()))
        .with_state(state)
        // The tool is loopback-only; a permissive CORS layer keeps file://
        // and dev-server UIs working.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
