use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::tickets;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(tickets::create_ticket))
        .route(
            "/:id",
            put(tickets::update_ticket).delete(tickets::delete_ticket),
        )
        .route_layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/", get(tickets::get_tickets))
        .route("/:id", get(tickets::get_ticket_by_id))
        .merge(protected)
}
