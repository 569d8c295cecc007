// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid ObjectId: {0}")]
    InvalidObjectId(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Organizer not found")]
    OrganizerNotFound,

    #[error("Event not found")]
    EventNotFound,

    #[error("Ticket not found")]
    TicketNotFound,

    #[error("Transaction not found")]
    TransactionNotFound,

    #[error("Insufficient ticket stock")]
    InsufficientStock,

    #[error("Ticket has already been used")]
    TicketAlreadyUsed,

    #[error("Ticket is not paid or has expired")]
    TicketNotPayable,

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("OTP is invalid")]
    OtpInvalid,

    #[error("OTP has expired")]
    OtpExpired,

    #[error("Too many OTP attempts")]
    TooManyAttempts,

    #[error("Authentication error")]
    AuthError,

    #[error("Access forbidden for this role")]
    Forbidden,

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Service error: {0}")]
    ServiceError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::MongoDB(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "Validation failed"),
            AppError::InvalidObjectId(_) => (StatusCode::BAD_REQUEST, "Invalid ID format"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            AppError::OrganizerNotFound => (StatusCode::NOT_FOUND, "Organizer not found"),
            AppError::EventNotFound => (StatusCode::NOT_FOUND, "Event not found"),
            AppError::TicketNotFound => (StatusCode::NOT_FOUND, "Ticket not found"),
            AppError::TransactionNotFound => (StatusCode::NOT_FOUND, "Transaction not found"),
            AppError::InsufficientStock => (StatusCode::BAD_REQUEST, "Insufficient stock"),
            AppError::TicketAlreadyUsed => (StatusCode::BAD_REQUEST, "Ticket already used"),
            AppError::TicketNotPayable => (StatusCode::BAD_REQUEST, "Ticket not payable"),
            AppError::DuplicateEntry(_) => (StatusCode::CONFLICT, "Duplicate entry"),
            AppError::OtpInvalid => (StatusCode::BAD_REQUEST, "Invalid OTP"),
            AppError::OtpExpired => (StatusCode::BAD_REQUEST, "OTP expired"),
            AppError::TooManyAttempts => (StatusCode::TOO_MANY_REQUESTS, "Too many attempts"),
            AppError::AuthError => (StatusCode::UNAUTHORIZED, "Authentication failed"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Access forbidden"),
            AppError::ExternalApi(_) => (StatusCode::BAD_GATEWAY, "External API error"),
            AppError::ConfigurationError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error")
            }
            AppError::ServiceError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Service error"),
        };

        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string(),
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

// Manual From implementations
impl From<mongodb::bson::oid::Error> for AppError {
    fn from(err: mongodb::bson::oid::Error) -> Self {
        AppError::InvalidObjectId(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::ServiceError(format!("BSON serialization failed: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ValidationError(format!("JSON parsing error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalApi(format!("HTTP request failed: {}", err))
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        AppError::DuplicateEntry(msg.into())
    }

    pub fn service(msg: impl Into<String>) -> Self {
        AppError::ServiceError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
