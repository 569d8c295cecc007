use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::Collection;
use serde_json::{json, Value};

use crate::errors::{AppError, Result};
use crate::models::event::{
    CreateEventRequest, Event, EventQuery, EventResponse, UpdateEventRequest, EVENT_CATEGORIES,
};
use crate::models::organizer::{Organizer, OrganizerStatus};
use crate::models::user::{Claims, Role};
use crate::state::AppState;

// Event creation requires an active organizer; its name and email are
// snapshotted onto the event for join-free listing.
pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    claims.authorize(&[Role::Organizer, Role::Admin])?;

    if payload.title.is_empty()
        || payload.description.is_empty()
        || payload.location.is_empty()
        || payload.dates.is_empty()
    {
        return Err(AppError::invalid_data(
            "Title, description, location and at least one date are required",
        ));
    }

    if !EVENT_CATEGORIES.contains(&payload.category.as_str()) {
        return Err(AppError::invalid_data(format!(
            "Invalid category '{}'",
            payload.category
        )));
    }

    let organizers: Collection<Organizer> = state.db.collection("organizers");
    let organizer_oid = ObjectId::parse_str(&payload.organizer_id)?;
    let organizer = organizers
        .find_one(doc! { "_id": organizer_oid })
        .await?
        .ok_or(AppError::OrganizerNotFound)?;

    if organizer.status != OrganizerStatus::Active {
        return Err(AppError::invalid_data("Organizer is not active yet"));
    }

    let now = Utc::now();
    let event = Event {
        id: Some(ObjectId::new()),
        organizer_id: payload.organizer_id,
        organizer_name: organizer.name,
        organizer_email: organizer.user_email,
        title: payload.title,
        description: payload.description,
        location: payload.location,
        category: payload.category,
        dates: payload.dates,
        created_at: now,
        updated_at: now,
    };

    let events: Collection<Event> = state.db.collection("events");
    events.insert_one(&event).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Event created",
            "data": EventResponse::from(event),
        })),
    ))
}

pub async fn get_all_events(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<Json<Vec<EventResponse>>> {
    let events: Collection<Event> = state.db.collection("events");

    let mut filter = Document::new();
    if let Some(category) = &query.category {
        filter.insert("category", category);
    }

    let cursor = events.find(filter).sort(doc! { "created_at": -1 }).await?;
    let all: Vec<Event> = cursor.try_collect().await?;

    Ok(Json(all.into_iter().map(EventResponse::from).collect()))
}

pub async fn get_event_by_id(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<EventResponse>> {
    let events: Collection<Event> = state.db.collection("events");
    let object_id = ObjectId::parse_str(&event_id)?;

    let event = events
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or(AppError::EventNotFound)?;

    Ok(Json(EventResponse::from(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<Value>> {
    claims.authorize(&[Role::Organizer, Role::Admin])?;

    let events: Collection<Event> = state.db.collection("events");
    let object_id = ObjectId::parse_str(&event_id)?;

    let mut set = Document::new();
    if let Some(title) = payload.title {
        set.insert("title", title);
    }
    if let Some(description) = payload.description {
        set.insert("description", description);
    }
    if let Some(location) = payload.location {
        set.insert("location", location);
    }
    if let Some(category) = payload.category {
        if !EVENT_CATEGORIES.contains(&category.as_str()) {
            return Err(AppError::invalid_data(format!(
                "Invalid category '{}'",
                category
            )));
        }
        set.insert("category", category);
    }
    if let Some(dates) = payload.dates {
        if dates.is_empty() {
            return Err(AppError::invalid_data("At least one date is required"));
        }
        set.insert("dates", bson::to_bson(&dates)?);
    }

    if set.is_empty() {
        return Err(AppError::invalid_data("No fields to update"));
    }
    set.insert("updated_at", Utc::now());

    let result = events
        .update_one(doc! { "_id": object_id }, doc! { "$set": set })
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::EventNotFound);
    }

    Ok(Json(json!({
        "message": "Event updated",
        "id": event_id,
    })))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<String>,
) -> Result<Json<Value>> {
    claims.authorize(&[Role::Organizer, Role::Admin])?;

    let events: Collection<Event> = state.db.collection("events");
    let object_id = ObjectId::parse_str(&event_id)?;

    let result = events.delete_one(doc! { "_id": object_id }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::EventNotFound);
    }

    Ok(Json(json!({
        "message": "Event deleted",
        "id": event_id,
    })))
}
