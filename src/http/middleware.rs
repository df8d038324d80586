use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::error::AppError;

use super::AppState;

/// Rejects any request without a matching `api_key` header. `/health` and
/// `/ping` are wired outside this layer entirely, so they never reach it.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get("api_key")
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == state.api_key.as_ref() => Ok(next.run(req).await),
        _ => {
            warn!(path = %req.uri().path(), "unauthorized request");
            Err(AppError::Unauthorized("unauthorized".to_string()))
        }
    }
}
