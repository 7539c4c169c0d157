use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::AppState;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok".to_string())
}

pub async fn health_db(State(state): State<AppState>) -> impl IntoResponse {
    match state.prefs.ping().await {
        Ok(_) => (StatusCode::OK, "store: ok".to_string()).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("store error: {}", e),
        )
            .into_response(),
    }
}
