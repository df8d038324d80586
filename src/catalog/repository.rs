use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use super::model::Product;

/// Default catalog inserted by [`seed_default_catalog`] on first startup.
/// IDs are fixed so reseeding an already-populated database is a no-op
/// rather than appending duplicates.
const DEFAULT_CATALOG: &[(Uuid, &str, f64, &str)] = &[
    (
        Uuid::from_u128(0x0001_0000_0000_0000_0000_0000_0000_0001),
        "Veggie Burger",
        9.50,
        "burgers",
    ),
    (
        Uuid::from_u128(0x0001_0000_0000_0000_0000_0000_0000_0002),
        "Classic Cheeseburger",
        10.25,
        "burgers",
    ),
    (
        Uuid::from_u128(0x0001_0000_0000_0000_0000_0000_0000_0003),
        "Margherita Pizza",
        13.00,
        "pizza",
    ),
    (
        Uuid::from_u128(0x0001_0000_0000_0000_0000_0000_0000_0004),
        "Caesar Salad",
        8.75,
        "salads",
    ),
    (
        Uuid::from_u128(0x0001_0000_0000_0000_0000_0000_0000_0005),
        "Sparkling Water",
        2.50,
        "drinks",
    ),
];

/// Inserts [`DEFAULT_CATALOG`] when the `products` table is empty. Run once
/// at startup, after migrations, so a fresh deployment has a working
/// catalog without a separate product-management API.
#[instrument(skip(pool))]
pub async fn seed_default_catalog(pool: &SqlitePool) -> Result<(), CatalogError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    for &(id, name, price, category) in DEFAULT_CATALOG {
        sqlx::query("INSERT INTO products (id, name, price, category) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(price)
            .bind(category)
            .execute(pool)
            .await?;
    }
    info!(count = DEFAULT_CATALOG.len(), "seeded default product catalog");
    Ok(())
}

/// Catalog-repository errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product not found: {0}")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read-only access to the product catalog. A trait so handlers and tests
/// can swap the SQLite-backed implementation for an in-memory one.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, CatalogError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Product, CatalogError>;
}

/// `ProductRepository` backed by the shared SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, category FROM products ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Product, CatalogError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, category FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or(CatalogError::NotFound(id))
    }
}
