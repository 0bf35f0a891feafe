use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{Category, Product, ProductFilters, ProductQuery, RecommendedProduct},
    routes::AppState,
    services::{RecommendationSource, Recommendations},
};

/// Longer queries are cut to this many characters
pub const MAX_QUERY_CHARS: usize = 200;

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub filters: ProductFilters,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub count: usize,
    pub query: String,
    pub filters: ProductFilters,
    pub source: RecommendationSource,
    pub data: Vec<RecommendedProduct>,
}

/// Handler for catalog listing
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ListResponse<Product>>> {
    let products = state.catalog.list_products(&query).await?;
    Ok(Json(ListResponse::new(products)))
}

/// Handler for categories with their subcategories
pub async fn categories(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let categories = state.catalog.categories().await?;
    Ok(Json(DataResponse::new(categories)))
}

/// Handler for distinct product colors
pub async fn colors(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let colors = state.catalog.colors().await?;
    Ok(Json(DataResponse::new(colors)))
}

/// Handler for a single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> AppResult<Json<DataResponse<Product>>> {
    let product = state.catalog.product(&product_id).await?;
    Ok(Json(DataResponse::new(product)))
}

/// Handler for natural-language product search
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SearchRequest>,
) -> AppResult<Json<SearchResponse>> {
    let query: String = request
        .query
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .chars()
        .take(MAX_QUERY_CHARS)
        .collect();

    if query.is_empty() {
        return Err(AppError::InvalidInput("Search query is required".to_string()));
    }

    let products = state.catalog.search_candidates(&request.filters).await?;

    tracing::info!(
        request_id = %request_id,
        query = %query,
        total_products = products.len(),
        catalog = state.catalog.name(),
        "Processing search request"
    );

    let recommendations = state
        .engine
        .recommend(&query, &request.filters, &products)
        .await;

    let data = ranked_products(&recommendations, &products);

    tracing::info!(
        request_id = %request_id,
        count = data.len(),
        source = ?recommendations.source,
        "Search completed"
    );

    Ok(Json(SearchResponse {
        success: true,
        count: data.len(),
        query,
        filters: request.filters,
        source: recommendations.source,
        data,
    }))
}

/// Products in recommendation order, leading positions flagged
fn ranked_products(recommendations: &Recommendations, products: &[Product]) -> Vec<RecommendedProduct> {
    let by_id: HashMap<&str, &Product> = products
        .iter()
        .map(|p| (p.product_id.as_str(), p))
        .collect();

    recommendations
        .ids
        .iter()
        .filter_map(|id| by_id.get(id.as_str()))
        .enumerate()
        .map(|(position, product)| RecommendedProduct {
            product: (*product).clone(),
            is_recommended: Recommendations::is_highly_recommended(position),
        })
        .collect()
}
