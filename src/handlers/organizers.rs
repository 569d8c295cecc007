use axum::{
    extract::{Path, State},
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
use crate::models::organizer::{
    CreateOrganizerRequest, Organizer, OrganizerResponse, OrganizerStatus, UpdateOrganizerRequest,
};
use crate::models::user::{Claims, Role, User};
use crate::state::AppState;

// Organizer registration. Denormalizes the user's contact details onto the
// organizer document and upgrades the user's role. Starts out pending until
// an admin approves it.
pub async fn create_organizer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateOrganizerRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    if payload.name.is_empty() || payload.description.is_empty() || payload.address.is_empty() {
        return Err(AppError::invalid_data(
            "Name, description and address are required",
        ));
    }

    let users: Collection<User> = state.db.collection("users");
    let user_oid = ObjectId::parse_str(&claims.sub)?;
    let user = users
        .find_one(doc! { "_id": user_oid })
        .await?
        .ok_or(AppError::UserNotFound)?;

    let organizers: Collection<Organizer> = state.db.collection("organizers");
    let existing = organizers.find_one(doc! { "user_id": &claims.sub }).await?;
    if existing.is_some() {
        return Err(AppError::duplicate(
            "An organizer is already registered for this user",
        ));
    }

    let now = Utc::now();
    let organizer = Organizer {
        id: Some(ObjectId::new()),
        user_id: claims.sub.clone(),
        name: payload.name,
        description: payload.description,
        address: payload.address,
        country: payload.country,
        state: payload.state,
        city: payload.city,
        zip_code: payload.zip_code,
        user_email: user.email,
        user_phone: user.phone,
        status: OrganizerStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    organizers.insert_one(&organizer).await?;

    users
        .update_one(
            doc! { "_id": user_oid },
            doc! { "$set": {
                "role": Role::Organizer.as_str(),
                "updated_at": Utc::now(),
            }},
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Organizer request created (status: pending)",
            "data": OrganizerResponse::from(organizer),
        })),
    ))
}

pub async fn get_all_organizers(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrganizerResponse>>> {
    let organizers: Collection<Organizer> = state.db.collection("organizers");

    let cursor = organizers.find(doc! {}).await?;
    let all: Vec<Organizer> = cursor.try_collect().await?;

    Ok(Json(all.into_iter().map(OrganizerResponse::from).collect()))
}

pub async fn get_organizer_by_id(
    State(state): State<AppState>,
    Path(organizer_id): Path<String>,
) -> Result<Json<OrganizerResponse>> {
    let organizers: Collection<Organizer> = state.db.collection("organizers");
    let object_id = ObjectId::parse_str(&organizer_id)?;

    let organizer = organizers
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or(AppError::OrganizerNotFound)?;

    Ok(Json(OrganizerResponse::from(organizer)))
}

// Admin-only: also the approval path (status -> active).
pub async fn update_organizer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(organizer_id): Path<String>,
    Json(payload): Json<UpdateOrganizerRequest>,
) -> Result<Json<Value>> {
    claims.authorize(&[Role::Admin])?;

    let organizers: Collection<Organizer> = state.db.collection("organizers");
    let object_id = ObjectId::parse_str(&organizer_id)?;

    let mut set = Document::new();
    if let Some(name) = payload.name {
        set.insert("name", name);
    }
    if let Some(description) = payload.description {
        set.insert("description", description);
    }
    if let Some(address) = payload.address {
        set.insert("address", address);
    }
    if let Some(country) = payload.country {
        set.insert("country", country);
    }
    if let Some(org_state) = payload.state {
        set.insert("state", org_state);
    }
    if let Some(city) = payload.city {
        set.insert("city", city);
    }
    if let Some(zip_code) = payload.zip_code {
        set.insert("zip_code", zip_code);
    }
    if let Some(status) = payload.status {
        set.insert("status", bson::to_bson(&status)?);
    }

    if set.is_empty() {
        return Err(AppError::invalid_data("No fields to update"));
    }
    set.insert("updated_at", Utc::now());

    let result = organizers
        .update_one(doc! { "_id": object_id }, doc! { "$set": set })
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::OrganizerNotFound);
    }

    Ok(Json(json!({
        "message": "Organizer updated",
        "id": organizer_id,
    })))
}

pub async fn delete_organizer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(organizer_id): Path<String>,
) -> Result<Json<Value>> {
    claims.authorize(&[Role::Admin])?;

    let organizers: Collection<Organizer> = state.db.collection("organizers");
    let object_id = ObjectId::parse_str(&organizer_id)?;

    let result = organizers.delete_one(doc! { "_id": object_id }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::OrganizerNotFound);
    }

    Ok(Json(json!({
        "message": "Organizer deleted",
        "id": organizer_id,
    })))
}
