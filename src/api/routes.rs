use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the add-on router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Add-on protocol
        .route("/:username/manifest.json", get(handlers::get_manifest))
        .route(
            "/:username/catalog/:media_type/:id",
            get(handlers::get_catalog),
        )
        .route(
            "/:username/catalog/:media_type/:id/:extra",
            get(handlers::get_catalog),
        )
        // Separate `Router::layer` calls (innermost first) so each layer sees
        // axum's `Body`; last added is outermost.
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(CorsLayer::permissive())
        // Outermost, so CORS preflight responses carry an id as well
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
