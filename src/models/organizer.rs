use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizerStatus {
    Pending,
    Active,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organizer {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,

    // Snapshot of the user at registration time; not kept in sync.
    pub user_email: String,
    pub user_phone: String,

    pub status: OrganizerStatus,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrganizerRequest {
    pub name: String,
    pub description: String,
    pub address: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrganizerRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub status: Option<OrganizerStatus>,
}

#[derive(Debug, Serialize)]
pub struct OrganizerResponse {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    pub user_email: String,
    pub user_phone: String,
    pub status: OrganizerStatus,
    pub created_at: String,
}

impl From<Organizer> for OrganizerResponse {
    fn from(org: Organizer) -> Self {
        OrganizerResponse {
            id: org.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: org.user_id,
            name: org.name,
            description: org.description,
            address: org.address,
            country: org.country,
            state: org.state,
            city: org.city,
            zip_code: org.zip_code,
            user_email: org.user_email,
            user_phone: org.user_phone,
            status: org.status,
            created_at: org.created_at.to_rfc3339(),
        }
    }
}
