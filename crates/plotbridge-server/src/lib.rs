//! # Plotbridge Server
//!
//! The HTTP surface of the bridge. Serves the drawing page and accepts:
//! - `POST /api/lines` — one drawn stroke as a JSON array of normalized
//!   points in the `line` form field
//! - `POST /api/{action}` — a named jog action with an empty body
//!
//! Handlers validate input, delegate to the plotter facade, and report
//! completion or failure; draw and jog responses both await the device
//! outcome, bounded by a timeout.

pub mod config;
pub mod routes;

pub use config::ServerConfig;
pub use routes::{router, serve, AppState};
