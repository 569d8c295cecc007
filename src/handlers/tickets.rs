use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::Collection;
use serde_json::{json, Value};

use crate::errors::{AppError, Result};
use crate::models::event::Event;
use crate::models::ticket::{
    CreateTicketRequest, TicketQuery, TicketResponse, TicketStatus, TicketType,
    UpdateTicketRequest,
};
use crate::models::user::{Claims, Role};
use crate::state::AppState;

// New ticket types start with stock equal to quota. From here on stock is
// owned by the ticketing service.
pub async fn create_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    claims.authorize(&[Role::Organizer, Role::Admin])?;

    if payload.name.is_empty() {
        return Err(AppError::invalid_data("Ticket name is required"));
    }
    if payload.price < 0.0 {
        return Err(AppError::invalid_data("Price must not be negative"));
    }
    if payload.quota <= 0 {
        return Err(AppError::invalid_data("Quota must be a positive integer"));
    }

    let events: Collection<Event> = state.db.collection("events");
    let event_oid = ObjectId::parse_str(&payload.event_id)?;
    events
        .find_one(doc! { "_id": event_oid })
        .await?
        .ok_or(AppError::EventNotFound)?;

    let now = Utc::now();
    let ticket = TicketType {
        id: Some(ObjectId::new()),
        event_id: payload.event_id,
        name: payload.name,
        description: payload.description,
        price: payload.price,
        quota: payload.quota,
        stock: payload.quota,
        sales_start: payload.sales_start,
        sales_end: payload.sales_end,
        status: TicketStatus::Available,
        created_at: now,
        updated_at: now,
    };

    let tickets: Collection<TicketType> = state.db.collection("tickets");
    tickets.insert_one(&ticket).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Ticket created",
            "data": TicketResponse::from(ticket),
        })),
    ))
}

pub async fn get_tickets(
    State(state): State<AppState>,
    Query(query): Query<TicketQuery>,
) -> Result<Json<Vec<TicketResponse>>> {
    let event_id = query
        .event_id
        .ok_or_else(|| AppError::invalid_data("Query parameter event_id is required"))?;

    let tickets: Collection<TicketType> = state.db.collection("tickets");
    let cursor = tickets.find(doc! { "event_id": &event_id }).await?;
    let all: Vec<TicketType> = cursor.try_collect().await?;

    Ok(Json(all.into_iter().map(TicketResponse::from).collect()))
}

pub async fn get_ticket_by_id(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Json<TicketResponse>> {
    let tickets: Collection<TicketType> = state.db.collection("tickets");
    let object_id = ObjectId::parse_str(&ticket_id)?;

    let ticket = tickets
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or(AppError::TicketNotFound)?;

    Ok(Json(TicketResponse::from(ticket)))
}

// Generic ticket update. `stock`, `quota`, `status` and `event_id` are not
// updatable here; inventory moves only through checkout and notifications.
pub async fn update_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ticket_id): Path<String>,
    Json(payload): Json<UpdateTicketRequest>,
) -> Result<Json<Value>> {
    claims.authorize(&[Role::Organizer, Role::Admin])?;

    let tickets: Collection<TicketType> = state.db.collection("tickets");
    let object_id = ObjectId::parse_str(&ticket_id)?;

    let mut set = Document::new();
    if let Some(name) = payload.name {
        set.insert("name", name);
    }
    if let Some(description) = payload.description {
        set.insert("description", description);
    }
    if let Some(price) = payload.price {
        if price < 0.0 {
            return Err(AppError::invalid_data("Price must not be negative"));
        }
        set.insert("price", price);
    }
    if let Some(sales_start) = payload.sales_start {
        set.insert("sales_start", sales_start.to_rfc3339());
    }
    if let Some(sales_end) = payload.sales_end {
        set.insert("sales_end", sales_end.to_rfc3339());
    }

    if set.is_empty() {
        return Err(AppError::invalid_data("No fields to update"));
    }
    set.insert("updated_at", Utc::now());

    let result = tickets
        .update_one(doc! { "_id": object_id }, doc! { "$set": set })
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::TicketNotFound);
    }

    Ok(Json(json!({
        "message": "Ticket updated",
        "id": ticket_id,
    })))
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ticket_id): Path<String>,
) -> Result<Json<Value>> {
    claims.authorize(&[Role::Organizer, Role::Admin])?;

    let tickets: Collection<TicketType> = state.db.collection("tickets");
    let object_id = ObjectId::parse_str(&ticket_id)?;

    let result = tickets.delete_one(doc! { "_id": object_id }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::TicketNotFound);
    }

    Ok(Json(json!({
        "message": "Ticket deleted",
        "id": ticket_id,
    })))
}
