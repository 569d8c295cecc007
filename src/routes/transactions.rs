use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::transactions;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/",
            post(transactions::create_transaction).get(transactions::get_user_transactions),
        )
        .route("/scan", post(transactions::scan_ticket))
        .route_layer(middleware::from_fn(auth_middleware));

    // The gateway calls the notification endpoint without a user token.
    Router::new()
        .route("/notification", post(transactions::payment_notification))
        .merge(protected)
}
