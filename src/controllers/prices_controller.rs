use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::AppState;

use super::error_response;

// GET /prices
pub async fn get_prices(State(state): State<AppState>) -> Response {
    match state.quantities.list().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => error_response(&e),
    }
}
