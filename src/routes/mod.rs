use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod home_routes;
pub mod preferences_routes;
pub mod events_routes;
pub mod prices_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = preferences_routes::add_routes(router);
    let router = events_routes::add_routes(router);
    let router = prices_routes::add_routes(router);

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
