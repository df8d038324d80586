use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::order::{Order, OrderRequest};

use super::AppState;

pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<OrderRequest>,
) -> Result<Json<Order>, AppError> {
    let order = state.orders.create_order(req).await?;
    Ok(Json(order))
}
