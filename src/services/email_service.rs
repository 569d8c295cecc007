use reqwest::Client;
use serde_json::json;

use crate::errors::{AppError, Result};

#[derive(Clone)]
pub struct EmailService {
    api_url: Option<String>,
    api_key: String,
    from: String,
    client: Client,
}

impl EmailService {
    pub fn new(api_url: Option<String>, api_key: String, from: String) -> Self {
        Self {
            api_url,
            api_key,
            from,
            client: Client::new(),
        }
    }

    pub async fn send_otp_email(&self, to: &str, otp: &str, first_name: &str) -> Result<()> {
        let subject = "Your verification code";
        let body = format!(
            "Hi {},\n\nYour verification code is: {}. It is valid for 10 minutes.",
            first_name, otp
        );

        let api_url = match &self.api_url {
            Some(url) => url,
            None => {
                // No relay configured (local/dev): log instead of sending.
                tracing::info!("email relay disabled, OTP for {}: {}", to, otp);
                return Ok(());
            }
        };

        let response = self
            .client
            .post(api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "text": body,
            }))
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Email API error: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::ExternalApi(format!(
                "Email sending failed with status: {}",
                response.status()
            )))
        }
    }
}
