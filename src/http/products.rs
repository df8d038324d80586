use axum::extract::{Path, State};
use axum::Json;

use crate::catalog::Product;
use crate::error::{parse_product_id, AppError};

use super::AppState;

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.products.list().await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let id = parse_product_id(&raw_id)?;
    let product = state.products.get_by_id(id).await?;
    Ok(Json(product))
}
