//! Route definitions
//!
//! Defines all HTTP API endpoints.

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers::{generate, healthz, voice};
use crate::server::AppState;

/// Create the API router.
///
/// With no allowed origins configured, CORS is permissive.
pub fn router(state: AppState, allowed_origins: Option<&[String]>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/generate", post(generate))
        .route("/voice", post(voice))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = allowed_origins.filter(|o| !o.is_empty()) else {
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}
