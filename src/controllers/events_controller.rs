use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    models::{PriceUpdateEvent, QuantityUpdatedEvent},
    AppState,
};

use super::error_response;

// POST /events/price-updated
//
// Called once per update of a tracked-quantity record. Any non-2xx answer
// tells the event source to redeliver.
pub async fn post_price_updated(
    State(state): State<AppState>,
    Json(body): Json<QuantityUpdatedEvent>,
) -> Response {
    let event = PriceUpdateEvent::from(body);

    match state.trigger.on_price_update(&event).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => error_response(&e),
    }
}
