//! HTTP routes and handlers
//!
//! The route set mirrors the original web interface: the drawing page at
//! `/`, one endpoint for full strokes, and one per-action endpoint for
//! jogs. Unknown jog action names are a no-op by design, not rejected.

use crate::config::ServerConfig;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use plotbridge_communication::Plotter;
use plotbridge_core::{JogAction, Point, ValidationError};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

const INDEX_HTML: &str = include_str!("../static/index.html");
const APP_JS: &str = include_str!("../static/js/app.js");

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the plotter facade
    pub plotter: Plotter,
    /// Bound on how long a request waits for queue completion
    pub request_timeout: Duration,
}

/// Body of a `POST /api/lines` request: the stroke as a JSON-encoded
/// array of normalized points, matching the browser client.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    /// JSON array of `{x,y}` objects in `[0,1]`
    pub line: String,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/js/app.js", get(app_js))
        .route("/api/lines", post(draw_line))
        .route("/api/{action}", post(jog_action))
        .fallback(not_found)
        .with_state(state)
}

/// Bind the listener and run the server until shutdown.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState {
        plotter: Plotter::new(config.device.clone()),
        request_timeout: config.request_timeout(),
    };
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "Server started on http://localhost:{}; press Ctrl-C to terminate",
        config.http_port
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    tracing::info!("Request for /");
    Html(INDEX_HTML)
}

async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript")], APP_JS)
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 - Not Found").into_response()
}

/// Handle one drawn stroke.
///
/// The response waits for the command queue to finish (bounded by the
/// configured timeout), so callers observe completion or failure
/// directly rather than through server-side logs.
async fn draw_line(State(state): State<AppState>, Form(form): Form<LineForm>) -> Response {
    tracing::info!("/api/lines called");

    let points: Vec<Point> = match serde_json::from_str(&form.line) {
        Ok(points) => points,
        Err(e) => {
            let err = ValidationError::MalformedPath {
                reason: e.to_string(),
            };
            tracing::warn!("Rejected line payload: {}", err);
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    match tokio::time::timeout(state.request_timeout, state.plotter.draw_path(&points)).await {
        Ok(Ok(())) => (StatusCode::OK, "OK").into_response(),
        Ok(Err(e)) if e.is_validation_error() => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!("Draw failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(_) => {
            tracing::error!("Draw did not finish within {:?}", state.request_timeout);
            (StatusCode::INTERNAL_SERVER_ERROR, "Draw timed out").into_response()
        }
    }
}

/// Handle one named jog action.
async fn jog_action(State(state): State<AppState>, Path(action): Path<String>) -> Response {
    let action = match action.parse::<JogAction>() {
        Ok(action) => action,
        Err(_) => {
            // Permissive by design: unknown names are ignored
            tracing::debug!("Ignoring unknown action '{}'", action);
            return (StatusCode::OK, "OK").into_response();
        }
    };

    match tokio::time::timeout(state.request_timeout, state.plotter.jog(action)).await {
        Ok(Ok(())) => (StatusCode::OK, "OK").into_response(),
        Ok(Err(e)) => {
            tracing::error!("Jog {} failed: {}", action, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(_) => {
            tracing::error!("Jog {} did not finish within {:?}", action, state.request_timeout);
            (StatusCode::INTERNAL_SERVER_ERROR, "Jog timed out").into_response()
        }
    }
}
