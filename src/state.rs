use std::sync::Arc;

use mongodb::Database;

use crate::config::AppConfig;
use crate::repositories::{MongoTicketStore, MongoTransactionStore};
use crate::services::email_service::EmailService;
use crate::services::otp_service::OtpService;
use crate::services::payment_gateway::MockPaymentGateway;
use crate::services::ticketing::TicketingService;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub ticketing: TicketingService,
    pub otp_service: OtpService,
    pub email_service: EmailService,
    pub jwt_secret: String,
    pub jwt_expiry_secs: i64,
}

impl AppState {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        let ticketing = TicketingService::new(
            Arc::new(MongoTicketStore::new(db.clone())),
            Arc::new(MongoTransactionStore::new(db.clone())),
            MockPaymentGateway::new(config.payment_base_url.clone()),
        );

        let otp_service = OtpService::new(db.clone());
        let email_service = EmailService::new(
            config.email_api_url.clone(),
            config.email_api_key.clone(),
            config.email_from.clone(),
        );

        AppState {
            db,
            ticketing,
            otp_service,
            email_service,
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiry_secs: config.jwt_expiry_secs,
        }
    }
}
