// models/transaction.rs
use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Purchase lifecycle. `pending -> paid -> used`, or `pending -> failed`.
/// `used` and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Paid,
    Used,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Paid => "paid",
            TransactionStatus::Used => "used",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Used | TransactionStatus::Failed)
    }

    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (TransactionStatus::Pending, TransactionStatus::Paid)
                | (TransactionStatus::Pending, TransactionStatus::Failed)
                | (TransactionStatus::Paid, TransactionStatus::Used)
        )
    }
}

/// Gateway notification statuses collapse to settled or failed; everything
/// else is ignored without a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Settled,
    Failed,
}

impl PaymentOutcome {
    pub fn from_gateway_status(status: &str) -> Option<Self> {
        match status {
            "settlement" | "success" => Some(PaymentOutcome::Settled),
            "expire" | "cancel" | "deny" => Some(PaymentOutcome::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub payment_url: String,
    pub va_number: String,
    pub order_ref: String,
    pub expiry_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub ticket_id: String,

    // Snapshots at checkout time; not kept in sync with the ticket.
    pub ticket_name: String,
    pub event_id: String,

    pub quantity: i64,
    pub total_price: f64,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
    pub status: TransactionStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanned_at: Option<bson::DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanned_by: Option<String>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub ticket_id: String,
    pub quantity: i64,
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentNotificationRequest {
    pub transaction_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub qr_code: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub user_id: String,
    pub ticket_id: String,
    pub ticket_name: String,
    pub event_id: String,
    pub quantity: i64,
    pub total_price: f64,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanned_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanned_by: Option<String>,
    pub created_at: String,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        TransactionResponse {
            id: tx.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: tx.user_id,
            ticket_id: tx.ticket_id,
            ticket_name: tx.ticket_name,
            event_id: tx.event_id,
            quantity: tx.quantity,
            total_price: tx.total_price,
            payment_method: tx.payment_method,
            payment_details: tx.payment_details,
            status: tx.status,
            scanned_at: tx
                .scanned_at
                .map(|d| d.try_to_rfc3339_string().unwrap_or_default()),
            scanned_by: tx.scanned_by,
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}
