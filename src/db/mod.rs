pub mod catalog;
pub mod postgres;

pub use catalog::{CatalogStore, InMemoryCatalogStore, PgCatalogStore};
pub use postgres::{create_pool, run_migrations};
