mod category;
mod filters;
mod product;

pub use category::{Category, Subcategory};
pub use filters::{ProductFilters, ProductQuery, DEFAULT_PAGE_LIMIT};
pub use product::{Product, RecommendedProduct, ScoredProduct};
