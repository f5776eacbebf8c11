//! Match review payloads and views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of `POST /matches/{id}/confirm`
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmMatchPayload {
    #[serde(alias = "volunteerId")]
    pub volunteer_id: Uuid,
}

/// Pending match as shown to admins for review
#[derive(Debug, Clone, Serialize)]
pub struct PendingMatch {
    pub match_id: Uuid,
    pub request_id: Uuid,
    pub aid_type: String,
    pub outstanding_quantity: i32,
    pub requester_email: String,
    pub resource_id: Uuid,
    pub available_quantity: i32,
    pub donor_email: String,
    pub created_at: DateTime<Utc>,
}
