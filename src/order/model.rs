use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Incoming order placement request. Mirrors `internal/order`'s
/// `OrderReq`, with `items` required rather than a nullable pointer — the
/// "missing items" and "empty items" cases are distinguished explicitly
/// by serde's presence check at the handler boundary instead.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    pub items: Vec<OrderItem>,
    #[serde(rename = "couponCode", skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    pub quantity: i64,
}

/// A placed order, enriched with the resolved product details for each
/// line item. Mirrors `internal/order`'s `Order` shape.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub items: Vec<OrderItem>,
    pub products: Vec<ProductRef>,
    #[serde(rename = "couponCode", skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductRef {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: f64,
}
