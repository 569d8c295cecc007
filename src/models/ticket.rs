use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Available,
    Closed,
}

/// A purchasable ticket category for an event. Invariant at rest:
/// `0 <= stock <= quota`. Stock is only mutated through the ticketing
/// service (checkout decrement, failure-notification restore); the generic
/// update endpoint never touches it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketType {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub event_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub quota: i64,
    pub stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_end: Option<DateTime<Utc>>,
    pub status: TicketStatus,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub event_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quota: i64,
    pub sales_start: Option<DateTime<Utc>>,
    pub sales_end: Option<DateTime<Utc>>,
}

/// Deliberately has no `stock`, `quota`, `status` or `event_id` fields:
/// inventory and ownership cannot be rewritten through the generic update.
#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub sales_start: Option<DateTime<Utc>>,
    pub sales_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    pub event_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: String,
    pub event_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub quota: i64,
    pub stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_end: Option<String>,
    pub status: TicketStatus,
}

impl From<TicketType> for TicketResponse {
    fn from(ticket: TicketType) -> Self {
        TicketResponse {
            id: ticket.id.map(|id| id.to_hex()).unwrap_or_default(),
            event_id: ticket.event_id,
            name: ticket.name,
            description: ticket.description,
            price: ticket.price,
            quota: ticket.quota,
            stock: ticket.stock,
            sales_start: ticket.sales_start.map(|d| d.to_rfc3339()),
            sales_end: ticket.sales_end.map(|d| d.to_rfc3339()),
            status: ticket.status,
        }
    }
}
