use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use mongodb::bson::doc;
use mongodb::{Collection, Database};
use rand::Rng;

use crate::errors::{AppError, Result};
use crate::models::otp::{PendingRegistration, MAX_OTP_ATTEMPTS, OTP_TTL_MINUTES};
use crate::models::user::RegisterRequest;

/// Holds registrations in `pending_registrations` until the emailed OTP is
/// verified. Codes are bcrypt-hashed at rest, capped at three attempts and
/// expire after ten minutes.
#[derive(Clone)]
pub struct OtpService {
    db: Database,
}

impl OtpService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<PendingRegistration> {
        self.db.collection("pending_registrations")
    }

    // Generate 6-digit OTP
    pub fn generate_otp() -> String {
        let mut rng = rand::thread_rng();
        format!("{:06}", rng.gen_range(0..1_000_000))
    }

    /// Stores (or replaces) the pending registration for this email.
    /// `password_hash` is already bcrypt-hashed by the caller.
    pub async fn create_pending(
        &self,
        payload: &RegisterRequest,
        password_hash: String,
        otp_code: &str,
    ) -> Result<()> {
        let otp_hash = hash(otp_code, DEFAULT_COST)
            .map_err(|e| AppError::service(format!("OTP hashing failed: {}", e)))?;

        let now = Utc::now();
        let pending = PendingRegistration {
            id: None,
            email: payload.email.clone(),
            password_hash,
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            phone: payload.phone.clone(),
            otp_hash,
            attempts: 0,
            expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
            created_at: now,
        };

        self.collection()
            .replace_one(doc! { "email": &payload.email }, &pending)
            .upsert(true)
            .await?;

        Ok(())
    }

    pub async fn pending_by_email(&self, email: &str) -> Result<Option<PendingRegistration>> {
        let pending = self.collection().find_one(doc! { "email": email }).await?;
        Ok(pending)
    }

    /// Issues a fresh code for an existing pending registration.
    pub async fn refresh_otp(&self, email: &str, otp_code: &str) -> Result<()> {
        let otp_hash = hash(otp_code, DEFAULT_COST)
            .map_err(|e| AppError::service(format!("OTP hashing failed: {}", e)))?;

        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);
        let update = doc! {
            "$set": {
                "otp_hash": otp_hash,
                "attempts": 0,
                "expires_at": expires_at,
            }
        };

        self.collection()
            .update_one(doc! { "email": email }, update)
            .await?;
        Ok(())
    }

    /// Checks the submitted code against the pending registration and returns
    /// it on success. Failed checks count against the attempt cap.
    pub async fn verify_pending(&self, email: &str, otp_code: &str) -> Result<PendingRegistration> {
        let pending = self
            .pending_by_email(email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if Utc::now() > pending.expires_at {
            return Err(AppError::OtpExpired);
        }

        if pending.attempts >= MAX_OTP_ATTEMPTS {
            return Err(AppError::TooManyAttempts);
        }

        let valid = verify(otp_code, &pending.otp_hash)
            .map_err(|e| AppError::service(format!("OTP verification failed: {}", e)))?;

        if !valid {
            self.collection()
                .update_one(
                    doc! { "email": email },
                    doc! { "$inc": { "attempts": 1 } },
                )
                .await?;
            return Err(AppError::OtpInvalid);
        }

        Ok(pending)
    }

    pub async fn delete_pending(&self, email: &str) -> Result<()> {
        self.collection().delete_one(doc! { "email": email }).await?;
        Ok(())
    }
}
