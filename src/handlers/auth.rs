use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;
use serde_json::{json, Value};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::user::{
    AuthResponse, Claims, LoginRequest, RegisterRequest, ResendOtpRequest, Role, User,
    UserResponse, VerifyOtpRequest,
};
use crate::services::otp_service::OtpService;
use crate::state::AppState;

fn issue_token(user: &User, secret: &str, expiry_secs: i64) -> Result<String> {
    let claims = Claims {
        sub: user.id.map(|id| id.to_hex()).unwrap_or_default(),
        email: user.email.clone(),
        role: user.role,
        exp: (Utc::now().timestamp() + expiry_secs) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AppError::service(format!("Token generation failed: {}", e)))
}

// Step 1 of registration: stash the profile and email an OTP. The account
// only exists once the OTP is verified.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    payload
        .validate()
        .map_err(|e| AppError::invalid_data(e.to_string()))?;

    let users: Collection<User> = state.db.collection("users");
    let existing = users.find_one(doc! { "email": &payload.email }).await?;
    if existing.is_some() {
        return Err(AppError::duplicate("Email is already registered"));
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| AppError::service(format!("Password hashing failed: {}", e)))?;

    let otp_code = OtpService::generate_otp();
    state
        .otp_service
        .create_pending(&payload, password_hash, &otp_code)
        .await?;

    state
        .email_service
        .send_otp_email(&payload.email, &otp_code, &payload.first_name)
        .await?;

    Ok(Json(json!({
        "message": "OTP sent to your email. Please verify to finish registration.",
        "data": {
            "email": payload.email,
            "otp_expires_in": "10 minutes",
        }
    })))
}

// Step 2: the OTP checks out, so the account becomes real and a token is
// issued right away.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload
        .validate()
        .map_err(|e| AppError::invalid_data(e.to_string()))?;

    let pending = state
        .otp_service
        .verify_pending(&payload.email, &payload.otp_code)
        .await?;

    let users: Collection<User> = state.db.collection("users");
    if users
        .find_one(doc! { "email": &pending.email })
        .await?
        .is_some()
    {
        state.otp_service.delete_pending(&pending.email).await?;
        return Err(AppError::duplicate("Email is already registered"));
    }

    let now = Utc::now();
    let user = User {
        id: Some(ObjectId::new()),
        email: pending.email.clone(),
        password_hash: pending.password_hash.clone(),
        first_name: pending.first_name.clone(),
        last_name: pending.last_name.clone(),
        phone: pending.phone.clone(),
        role: Role::User,
        email_verified: true,
        image_url: None,
        date_of_birth: None,
        created_at: now,
        updated_at: now,
    };

    users.insert_one(&user).await?;
    state.otp_service.delete_pending(&pending.email).await?;

    let token = issue_token(&user, &state.jwt_secret, state.jwt_expiry_secs)?;

    tracing::info!("user {} registered and verified", user.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful",
            "data": AuthResponse {
                user: UserResponse::from(user),
                token,
            }
        })),
    ))
}

pub async fn resend_otp(
    State(state): State<AppState>,
    Json(payload): Json<ResendOtpRequest>,
) -> Result<Json<Value>> {
    payload
        .validate()
        .map_err(|e| AppError::invalid_data(e.to_string()))?;

    let pending = state
        .otp_service
        .pending_by_email(&payload.email)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let otp_code = OtpService::generate_otp();
    state
        .otp_service
        .refresh_otp(&payload.email, &otp_code)
        .await?;

    state
        .email_service
        .send_otp_email(&payload.email, &otp_code, &pending.first_name)
        .await?;

    Ok(Json(json!({
        "message": "A new OTP has been sent to your email",
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let users: Collection<User> = state.db.collection("users");

    let user = users
        .find_one(doc! { "email": &payload.email })
        .await?
        .ok_or(AppError::AuthError)?;

    let valid = verify(&payload.password, &user.password_hash).map_err(|_| AppError::AuthError)?;
    if !valid {
        return Err(AppError::AuthError);
    }

    let token = issue_token(&user, &state.jwt_secret, state.jwt_expiry_secs)?;

    Ok(Json(json!({
        "message": "Login successful",
        "data": AuthResponse {
            user: UserResponse::from(user),
            token,
        }
    })))
}
