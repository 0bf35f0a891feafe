use std::collections::BTreeSet;

use super::CatalogStore;
use crate::{
    error::{AppError, AppResult},
    models::{Category, Product, ProductFilters, ProductQuery},
};

/// Catalog held in memory, for tests and local demos
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogStore {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl InMemoryCatalogStore {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            categories: Vec::new(),
        }
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_products(&self, query: &ProductQuery) -> AppResult<Vec<Product>> {
        let filters = query.filters();
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|p| filters.matches(p))
            .filter(|p| {
                query
                    .category
                    .as_ref()
                    .map_or(true, |c| &p.category_name == c)
            })
            .filter(|p| {
                query
                    .subcategory
                    .as_ref()
                    .map_or(true, |s| &p.subcategory_name == s)
            })
            .cloned()
            .collect();

        // Newest first; undated products sort last
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(products
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect())
    }

    async fn search_candidates(&self, filters: &ProductFilters) -> AppResult<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|p| filters.matches(p))
            .cloned()
            .collect())
    }

    async fn product(&self, product_id: &str) -> AppResult<Product> {
        self.products
            .iter()
            .find(|p| p.product_id == product_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    async fn categories(&self) -> AppResult<Vec<Category>> {
        let mut categories = self.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        for category in &mut categories {
            category.subcategories.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(categories)
    }

    async fn colors(&self) -> AppResult<Vec<String>> {
        let colors: BTreeSet<String> = self
            .products
            .iter()
            .filter_map(|p| p.color.clone())
            .collect();
        Ok(colors.into_iter().collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
