use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::store::PageStore;

pub mod handlers;
pub mod models;

pub fn create_router(store: Arc<PageStore>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/search", get(handlers::search_handler))
        .route("/api/health", get(handlers::health_handler))
        .with_state(store)
        .layer(cors)
}
