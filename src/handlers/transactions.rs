use axum::{extract::State, http::StatusCode, response::Json, Extension};
use serde_json::{json, Value};

use crate::errors::Result;
use crate::models::transaction::{
    CreateTransactionRequest, PaymentNotificationRequest, ScanRequest, TransactionResponse,
};
use crate::models::user::{Claims, Role};
use crate::services::ticketing::NotificationResult;
use crate::state::AppState;

// Checkout: reserve stock, create a pending transaction, hand back the
// payment intent.
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let transaction = state
        .ticketing
        .checkout(
            &claims.sub,
            &payload.ticket_id,
            payload.quantity,
            payload.payment_method,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Transaction created",
            "data": TransactionResponse::from(transaction),
        })),
    ))
}

// Gateway-facing webhook. Unauthenticated; must stay idempotent because the
// gateway retries deliveries.
pub async fn payment_notification(
    State(state): State<AppState>,
    Json(payload): Json<PaymentNotificationRequest>,
) -> Result<Json<Value>> {
    let result = state
        .ticketing
        .handle_notification(&payload.transaction_id, &payload.status)
        .await?;

    let message = match result {
        NotificationResult::Settled => "Payment settled",
        NotificationResult::Failed => "Payment failed, stock returned",
        NotificationResult::AlreadyProcessed => "Notification already processed",
        NotificationResult::Ignored => "Notification ignored",
    };

    Ok(Json(json!({ "message": message })))
}

pub async fn get_user_transactions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<TransactionResponse>>> {
    let transactions = state.ticketing.user_transactions(&claims.sub).await?;

    let responses: Vec<TransactionResponse> = transactions
        .into_iter()
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(responses))
}

// Venue gate: redeem a paid transaction exactly once.
pub async fn scan_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<Value>> {
    claims.authorize(&[Role::TicketChecker, Role::Organizer, Role::Admin])?;

    let receipt = state.ticketing.scan(&payload.qr_code, &claims.sub).await?;

    Ok(Json(json!({
        "message": "Ticket valid. Entry granted.",
        "data": {
            "ticket_name": receipt.ticket_name,
            "event_id": receipt.event_id,
            "holder_id": receipt.holder_id,
        }
    })))
}
