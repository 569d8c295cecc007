use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::Collection;
use serde_json::{json, Value};

use crate::errors::{AppError, Result};
use crate::models::user::{Claims, Role, UpdateUserRequest, User, UserResponse};
use crate::state::AppState;

fn authorize_self_or_admin(claims: &Claims, user_id: &str) -> Result<()> {
    if claims.sub == user_id || claims.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>> {
    let users: Collection<User> = state.db.collection("users");
    let object_id = ObjectId::parse_str(&user_id)?;

    let user = users
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Value>> {
    authorize_self_or_admin(&claims, &user_id)?;

    let users: Collection<User> = state.db.collection("users");
    let object_id = ObjectId::parse_str(&user_id)?;

    let mut set = Document::new();
    if let Some(first_name) = payload.first_name {
        set.insert("first_name", first_name);
    }
    if let Some(last_name) = payload.last_name {
        set.insert("last_name", last_name);
    }
    if let Some(phone) = payload.phone {
        set.insert("phone", phone);
    }
    if let Some(image_url) = payload.image_url {
        set.insert("image_url", image_url);
    }
    if let Some(date_of_birth) = payload.date_of_birth {
        set.insert("date_of_birth", date_of_birth);
    }
    if let Some(role) = payload.role {
        if claims.role != Role::Admin {
            return Err(AppError::Forbidden);
        }
        set.insert("role", role.as_str());
    }

    if set.is_empty() {
        return Err(AppError::invalid_data("No fields to update"));
    }
    set.insert("updated_at", Utc::now());

    let result = users
        .update_one(doc! { "_id": object_id }, doc! { "$set": set })
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::UserNotFound);
    }

    Ok(Json(json!({
        "message": "User profile updated",
        "id": user_id,
    })))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    authorize_self_or_admin(&claims, &user_id)?;

    let users: Collection<User> = state.db.collection("users");
    let object_id = ObjectId::parse_str(&user_id)?;

    let result = users.delete_one(doc! { "_id": object_id }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::UserNotFound);
    }

    Ok(Json(json!({
        "message": "User profile deleted",
        "id": user_id,
    })))
}
