use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::CatalogStore,
    middleware::{request_id::make_span_with_request_id, request_id_middleware},
    services::RecommendationEngine,
};

pub mod products;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub engine: Arc<RecommendationEngine>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogStore>, engine: RecommendationEngine) -> Self {
        Self {
            catalog,
            engine: Arc::new(engine),
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/products", product_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// Product routes under /api/products
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list))
        .route("/categories", get(products::categories))
        .route("/colors", get(products::colors))
        .route("/search", post(products::search))
        .route("/:product_id", get(products::get_product))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
