use axum::{Router, routing::{get, put}};
use crate::{AppState, controllers::preferences_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/prefs/:device_id", get(preferences_controller::get_preference))
        .route("/prefs/:device_id/:quantity_id", put(preferences_controller::put_preference))
}
