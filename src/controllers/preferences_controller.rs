use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{models::PreferenceWrite, AppState};

use super::error_response;

// PUT /prefs/:device_id/:quantity_id
pub async fn put_preference(
    State(state): State<AppState>,
    Path((device_id, quantity_id)): Path<(String, String)>,
    Json(update): Json<PreferenceWrite>,
) -> Response {
    match state.prefs.write(&device_id, &quantity_id, &update).await {
        Ok(pref) => (StatusCode::OK, Json(pref)).into_response(),
        Err(e) => {
            tracing::debug!(%device_id, %quantity_id, error = %e, "preference write rejected");
            error_response(&e)
        }
    }
}

// GET /prefs/:device_id
pub async fn get_preference(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Response {
    match state.prefs.get(&device_id).await {
        Ok(Some(pref)) => (StatusCode::OK, Json(pref)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no preferences for {device_id}") })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}
