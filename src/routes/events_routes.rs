use axum::{Router, routing::post};
use crate::{AppState, controllers::events_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/events/price-updated", post(events_controller::post_price_updated))
}
