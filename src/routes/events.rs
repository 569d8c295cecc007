use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::events;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(events::create_event))
        .route("/:id", put(events::update_event).delete(events::delete_event))
        .route_layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/", get(events::get_all_events))
        .route("/:id", get(events::get_event_by_id))
        .merge(protected)
}
