use axum::{
    http::{header, Method},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::api::{api_routes, public_routes};

use super::AppState;

/// Template bodies are the largest payloads we accept.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub fn create_app(state: AppState) -> Router {
    // Public template API is embeddable from any site
    let public_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // CORS sits outside the body limit so a 413 still carries its headers
    let public = public_routes()
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(public_cors);

    Router::new()
        .merge(public)
        .merge(api_routes().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
