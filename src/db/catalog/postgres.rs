use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;

use super::CatalogStore;
use crate::{
    error::{AppError, AppResult},
    models::{Category, Product, ProductFilters, ProductQuery, Subcategory},
};

const PRODUCT_SELECT: &str = r#"
    SELECT
        p.product_id,
        p.title,
        p.description,
        c.name AS category_name,
        s.name AS subcategory_name,
        p.price,
        p.color,
        p.image_url,
        p.created_at
    FROM products p
    JOIN subcategories s ON p.subcategory_id = s.id
    JOIN categories c ON s.category_id = c.id
    WHERE 1=1"#;

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    description: Option<String>,
}

/// PostgreSQL-backed catalog
#[derive(Clone)]
pub struct PgCatalogStore {
    db_pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

/// Product query with the structured filters appended
fn filtered_products(filters: &ProductFilters) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(PRODUCT_SELECT);

    if let Some(color) = &filters.color {
        builder.push(" AND p.color = ").push_bind(color.clone());
    }
    if let Some(min_price) = filters.min_price {
        builder.push(" AND p.price >= ").push_bind(min_price);
    }
    if let Some(max_price) = filters.max_price {
        builder.push(" AND p.price <= ").push_bind(max_price);
    }

    builder
}

fn listing(query: &ProductQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = filtered_products(&query.filters());

    if let Some(category) = &query.category {
        builder.push(" AND c.name = ").push_bind(category.clone());
    }
    if let Some(subcategory) = &query.subcategory {
        builder.push(" AND s.name = ").push_bind(subcategory.clone());
    }

    builder
        .push(" ORDER BY p.created_at DESC LIMIT ")
        .push_bind(query.limit())
        .push(" OFFSET ")
        .push_bind(query.offset());

    builder
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_products(&self, query: &ProductQuery) -> AppResult<Vec<Product>> {
        let products = listing(query)
            .build_query_as::<Product>()
            .fetch_all(&self.db_pool)
            .await?;

        tracing::debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    async fn search_candidates(&self, filters: &ProductFilters) -> AppResult<Vec<Product>> {
        // Stable order keeps vocabulary construction deterministic
        let mut builder = filtered_products(filters);
        builder.push(" ORDER BY p.id");

        let products = builder
            .build_query_as::<Product>()
            .fetch_all(&self.db_pool)
            .await?;

        if !filters.is_empty() {
            tracing::info!(
                filters = %filters,
                matched = products.len(),
                "Filters applied to search candidates"
            );
        }

        Ok(products)
    }

    async fn product(&self, product_id: &str) -> AppResult<Product> {
        let mut builder = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        builder
            .push(" AND p.product_id = ")
            .push_bind(product_id.to_string());

        builder
            .build_query_as::<Product>()
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    async fn categories(&self) -> AppResult<Vec<Category>> {
        let rows: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, name, description FROM categories ORDER BY name")
                .fetch_all(&self.db_pool)
                .await?;

        let subcategories: Vec<Subcategory> = sqlx::query_as(
            "SELECT id, category_id, name, description FROM subcategories ORDER BY name",
        )
        .fetch_all(&self.db_pool)
        .await?;

        let mut by_category: HashMap<i64, Vec<Subcategory>> = HashMap::new();
        for subcategory in subcategories {
            by_category
                .entry(subcategory.category_id)
                .or_default()
                .push(subcategory);
        }

        Ok(rows
            .into_iter()
            .map(|row| Category {
                subcategories: by_category.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                description: row.description,
            })
            .collect())
    }

    async fn colors(&self) -> AppResult<Vec<String>> {
        let colors: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT color FROM products WHERE color IS NOT NULL ORDER BY color",
        )
        .fetch_all(&self.db_pool)
        .await?;
        Ok(colors)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
