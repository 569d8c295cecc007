use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::organizers;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(organizers::create_organizer))
        .route(
            "/:id",
            axum::routing::put(organizers::update_organizer)
                .delete(organizers::delete_organizer),
        )
        .route_layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/", get(organizers::get_all_organizers))
        .route("/:id", get(organizers::get_organizer_by_id))
        .merge(protected)
}
