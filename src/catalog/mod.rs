//! Product catalog: a small read-only repository backed by the shared
//! SQLite pool, seeded once at startup.

mod model;
mod repository;

pub use model::Product;
pub use repository::{seed_default_catalog, CatalogError, ProductRepository, SqliteProductRepository};
