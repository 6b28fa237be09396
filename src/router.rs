use axum::{Router, routing::get};

use crate::{AppState, middleware::log_errors, routes};

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(routes::requests::get_requests))
        .route("/requests/range", get(routes::requests::get_range))
        .route("/requests/export", get(routes::requests::export_range))
}

/// All API routes nested under the configured base URI, with error logging.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/ping", get(routes::health::ping))
        .merge(request_routes());

    let router = if state.config.api_base_uri.is_empty() || state.config.api_base_uri == "/" {
        api
    } else {
        Router::new().nest(&state.config.api_base_uri, api)
    };

    router
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
