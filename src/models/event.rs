use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const EVENT_CATEGORIES: &[&str] = &[
    "music",
    "sports",
    "arts",
    "conference",
    "workshop",
    "festival",
    "other",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub organizer_id: String,

    // Snapshot of the organizer at creation time; not kept in sync.
    pub organizer_name: String,
    pub organizer_email: String,

    pub title: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub dates: Vec<DateTime<Utc>>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub organizer_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub dates: Vec<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub dates: Option<Vec<DateTime<Utc>>>,
}

#[derive(Debug, Deserialize)]
pub struct EventQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: String,
    pub organizer_id: String,
    pub organizer_name: String,
    pub organizer_email: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub dates: Vec<String>,
    pub created_at: String,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        EventResponse {
            id: event.id.map(|id| id.to_hex()).unwrap_or_default(),
            organizer_id: event.organizer_id,
            organizer_name: event.organizer_name,
            organizer_email: event.organizer_email,
            title: event.title,
            description: event.description,
            location: event.location,
            category: event.category,
            dates: event.dates.iter().map(|d| d.to_rfc3339()).collect(),
            created_at: event.created_at.to_rfc3339(),
        }
    }
}
