use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// Build the CORS layer. Origins stay permissive (public documents are
/// read cross-site); methods are limited to what the API actually serves.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
}
