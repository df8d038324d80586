use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::promo::{ValidationError, Validator};

use super::model::{Order, OrderRequest};
use super::repository::{OrderError, OrderRepository};

/// Errors surfaced by order placement, covering request validation, coupon
/// validation, and persistence in one place so handlers have a single
/// error type to classify.
#[derive(Debug, Error)]
pub enum OrderServiceError {
    #[error("order must have at least one item")]
    EmptyItems,

    #[error("quantity must be greater than 0")]
    NonPositiveQuantity,

    #[error(transparent)]
    Coupon(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] OrderError),
}

/// Places orders: validates the request shape, checks the coupon code
/// (when present) against the shared validator, then persists.
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    promo: Arc<Validator>,
}

impl OrderService {
    #[must_use]
    pub fn new(repo: Arc<dyn OrderRepository>, promo: Arc<Validator>) -> Self {
        Self { repo, promo }
    }

    #[instrument(skip(self, req))]
    pub async fn create_order(&self, req: OrderRequest) -> Result<Order, OrderServiceError> {
        if req.items.is_empty() {
            return Err(OrderServiceError::EmptyItems);
        }
        if req.items.iter().any(|item| item.quantity <= 0) {
            return Err(OrderServiceError::NonPositiveQuantity);
        }
        if let Some(code) = &req.coupon_code {
            self.promo.validate(code)?;
        }

        let order = self
            .repo
            .create(Uuid::new_v4(), req.items, req.coupon_code)
            .await?;
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::order::model::OrderItem;
    use crate::promo::Index;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubRepo {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl OrderRepository for StubRepo {
        async fn create(
            &self,
            id: Uuid,
            items: Vec<OrderItem>,
            coupon_code: Option<String>,
        ) -> Result<Order, OrderError> {
            *self.calls.lock().unwrap() += 1;
            Ok(Order {
                id,
                items,
                products: Vec::new(),
                coupon_code,
            })
        }
    }

    fn service_with_stub() -> OrderService {
        let index = Arc::new(Index::new());
        index.set("SHARED1234");
        index.set("SHARED1234");
        let promo = Arc::new(Validator::from_index(index));
        let repo: Arc<dyn OrderRepository> = Arc::new(StubRepo {
            calls: Mutex::new(0),
        });
        OrderService::new(repo, promo)
    }

    #[tokio::test]
    async fn empty_items_is_rejected() {
        let service = service_with_stub();
        let req = OrderRequest {
            items: Vec::new(),
            coupon_code: None,
        };
        assert!(matches!(
            service.create_order(req).await,
            Err(OrderServiceError::EmptyItems)
        ));
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected() {
        let service = service_with_stub();
        let req = OrderRequest {
            items: vec![OrderItem {
                product_id: Uuid::new_v4(),
                quantity: 0,
            }],
            coupon_code: None,
        };
        assert!(matches!(
            service.create_order(req).await,
            Err(OrderServiceError::NonPositiveQuantity)
        ));
    }

    #[tokio::test]
    async fn invalid_coupon_code_is_rejected_before_persistence() {
        let service = service_with_stub();
        let req = OrderRequest {
            items: vec![OrderItem {
                product_id: Uuid::new_v4(),
                quantity: 1,
            }],
            coupon_code: Some("NOTREAL12".to_string()),
        };
        assert!(matches!(
            service.create_order(req).await,
            Err(OrderServiceError::Coupon(_))
        ));
    }

    #[tokio::test]
    async fn valid_request_is_persisted() {
        let service = service_with_stub();
        let req = OrderRequest {
            items: vec![OrderItem {
                product_id: Uuid::new_v4(),
                quantity: 1,
            }],
            coupon_code: Some("SHARED1234".to_string()),
        };
        let order = service.create_order(req).await.unwrap();
        assert_eq!(order.coupon_code.as_deref(), Some("SHARED1234"));
    }
}
