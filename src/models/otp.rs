use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Registration data held until the emailed OTP is verified. The password and
/// OTP code are stored bcrypt-hashed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRegistration {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub phone: String,
    pub otp_hash: String,
    pub attempts: i32,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

pub const MAX_OTP_ATTEMPTS: i32 = 3;
pub const OTP_TTL_MINUTES: i64 = 10;
