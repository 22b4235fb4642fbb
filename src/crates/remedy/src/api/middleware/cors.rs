//! CORS middleware configuration

use tower_http::cors::CorsLayer;

/// Permissive CORS for local clients.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}
