use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::AlertError;

pub mod home_controller;
pub mod preferences_controller;
pub mod events_controller;
pub mod prices_controller;

fn error_response(e: &AlertError) -> Response {
    let status = match e {
        AlertError::Validation(_) => StatusCode::BAD_REQUEST,
        // 5xx so the event source redelivers
        AlertError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        AlertError::Delivery { .. } | AlertError::PriceFeed(_) => StatusCode::BAD_GATEWAY,
        AlertError::Timeout { .. } | AlertError::MatchTimeout => StatusCode::GATEWAY_TIMEOUT,
    };

    let mut body = json!({ "error": e.to_string() });
    if let AlertError::Timeout { outcome, pending } = e {
        body["outcome"] = json!(outcome);
        body["pending"] = json!(pending);
    }

    (status, Json(body)).into_response()
}
