use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use super::model::{Order, OrderItem, ProductRef};

/// Order-repository errors.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persists orders and resolves the product details referenced by their
/// line items, in a single transaction per order.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(
        &self,
        id: Uuid,
        items: Vec<OrderItem>,
        coupon_code: Option<String>,
    ) -> Result<Order, OrderError>;
}

#[derive(Debug, Clone)]
pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    #[instrument(skip(self, items))]
    async fn create(
        &self,
        id: Uuid,
        items: Vec<OrderItem>,
        coupon_code: Option<String>,
    ) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO orders (id, coupon_code) VALUES (?, ?)")
            .bind(id)
            .bind(&coupon_code)
            .execute(&mut *tx)
            .await?;

        let mut products = Vec::with_capacity(items.len());
        for item in &items {
            let product = sqlx::query_as::<_, ProductRef>(
                "SELECT id, name, category, price FROM products WHERE id = ?",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(OrderError::ProductNotFound(item.product_id))?;

            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, quantity) VALUES (?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            products.push(product);
        }

        tx.commit().await?;

        Ok(Order {
            id,
            items,
            products,
            coupon_code,
        })
    }
}
