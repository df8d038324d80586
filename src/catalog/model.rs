use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single catalog entry. Mirrors `internal/product`'s `Product` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub category: String,
}
