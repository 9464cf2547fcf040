//! # chime-server
//!
//! The HTTP and WebSocket surface of chime.
//!
//! Classified events arrive on a bounded channel and are fanned out by the
//! [`Hub`] to every connected WebSocket subscriber as JSON text frames.
//! The same router also serves the browser UI, sound pack files, and the
//! configuration API.
//!
//! ## Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/ws` | GET | WebSocket event stream (every subscriber gets everything) |
//! | `/api/config` | GET | Current configuration |
//! | `/api/config` | PUT | Update and persist configuration |
//! | `/api/packs` | GET | List installed sound packs |
//! | `/api/packs/{name}/manifest` | GET | One pack's manifest |
//! | `/sounds/*` | GET | Pack audio files |
//! | `/*` | GET | Static UI assets |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod handlers;
pub mod hub;
pub mod routes;
pub mod server;
pub mod state;
pub mod websocket;

pub use error::{ServerError, ServerResult};
pub use hub::Hub;
pub use routes::create_router;
pub use server::{ChimeServer, ServerConfig, EVENT_QUEUE_CAPACITY};
pub use state::AppState;
