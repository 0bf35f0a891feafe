//! Catalog data access
//!
//! The catalog performs all structured filtering (color, price range,
//! category); the recommendation engine only ever sees the narrowed result.

use crate::{
    error::AppResult,
    models::{Category, Product, ProductFilters, ProductQuery},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCatalogStore;
pub use postgres::PgCatalogStore;

#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// One page of products, newest first
    async fn list_products(&self, query: &ProductQuery) -> AppResult<Vec<Product>>;

    /// Every product matching the filters; the candidate set for a search
    async fn search_candidates(&self, filters: &ProductFilters) -> AppResult<Vec<Product>>;

    /// Single product by id, or `NotFound`
    async fn product(&self, product_id: &str) -> AppResult<Product>;

    /// Categories by name, each with its subcategories by name
    async fn categories(&self) -> AppResult<Vec<Category>>;

    /// Distinct product colors, sorted
    async fn colors(&self) -> AppResult<Vec<String>>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}
