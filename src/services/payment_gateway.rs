use chrono::{Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::models::transaction::PaymentDetails;

/// Stand-in for a real payment provider. Produces a redirect URL and a
/// virtual-account number; the transaction is settled later through the
/// notification endpoint.
#[derive(Clone)]
pub struct MockPaymentGateway {
    base_url: String,
}

impl MockPaymentGateway {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    pub fn create_intent(&self, transaction_id: &str) -> PaymentDetails {
        let mut rng = rand::thread_rng();
        let va_number: String = (0..10).map(|_| rng.gen_range(0..10).to_string()).collect();

        PaymentDetails {
            payment_url: format!("{}/pay/{}", self.base_url, transaction_id),
            va_number,
            order_ref: Uuid::new_v4().simple().to_string(),
            expiry_time: Utc::now() + Duration::hours(1),
        }
    }
}
