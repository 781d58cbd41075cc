use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::addon;
use crate::state::AppState;

/// Assemble the addon router with its middleware stack.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/manifest.json", get(addon::manifest_handler))
        .route("/stream/{media_type}/{id}", get(addon::stream_handler))
        .route("/health", get(health_handler))
        // Addon clients call from foreign origins; the protocol requires
        // wide-open CORS.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
