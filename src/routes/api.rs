use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::handlers::{diagnostics, health_check, ready_check};
use crate::relay::RelayState;
use crate::websocket::handler::websocket_handler;

/// Create the application routes: the REST API plus the relay's
/// WebSocket endpoint at its fixed path.
pub fn create_routes(state: Arc<RelayState>, config: &Config) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/ready", get(ready_check))
        .route("/api/v1/diagnostics", get(diagnostics))
        .route("/api/socket", get(websocket_handler))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for browser clients: a configured comma-separated origin
/// allowlist, or any origin when none is configured.
fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods([Method::GET, Method::POST]);
    match config.cors_origins.as_deref() {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            cors.allow_origin(AllowOrigin::list(origins))
        }
        None => cors.allow_origin(Any),
    }
}
