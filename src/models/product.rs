use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog product as supplied by the catalog store
///
/// The recommendation engine only reads `product_id`, `title`, `category_name`,
/// `subcategory_name`, `price` and `color`. The remaining fields are carried
/// through to API responses untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Product {
    pub product_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category_name: String,
    pub subcategory_name: String,
    pub price: f64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(
        product_id: impl Into<String>,
        title: impl Into<String>,
        category_name: impl Into<String>,
        subcategory_name: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            title: title.into(),
            description: None,
            category_name: category_name.into(),
            subcategory_name: subcategory_name.into(),
            price,
            color: None,
            image_url: None,
            created_at: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Text used for vocabulary building and vectorization
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title, self.category_name, self.subcategory_name
        )
    }
}

/// A product paired with its relevance score for one ranking pass
#[derive(Debug, Clone, Copy)]
pub struct ScoredProduct<'a> {
    pub product: &'a Product,
    pub score: f64,
}

/// A product annotated for the search response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub is_recommended: bool,
}
