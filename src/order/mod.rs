//! Order placement: validation, coupon-code checking, and persistence.

mod model;
mod repository;
mod service;

pub use model::{Order, OrderItem, OrderRequest, ProductRef};
pub use repository::{OrderError, OrderRepository, SqliteOrderRepository};
pub use service::{OrderService, OrderServiceError};
