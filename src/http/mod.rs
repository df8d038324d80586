//! HTTP layer: router construction, API-key middleware, and handlers.

mod middleware;
mod orders;
mod products;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::catalog::ProductRepository;
use crate::order::OrderService;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub orders: Arc<OrderService>,
    pub api_key: Arc<str>,
}

/// Builds the full application router: public health routes plus the
/// API-key-gated catalog and order routes.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product))
        .route("/order", post(orders::create_order))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/ping", get(ping))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn ping() -> &'static str {
    "pong"
}
