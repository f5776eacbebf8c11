//! Volunteer assignment views

use chrono::{DateTime, Utc};
use matching::models::{AidRequestStatus, AssignmentOrigin};
use serde::Serialize;
use uuid::Uuid;

/// Contact details a volunteer needs to pick up or deliver aid
#[derive(Debug, Clone, Serialize)]
pub struct ContactCard {
    pub first_name: String,
    pub last_name: String,
    pub phone_no: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
}

/// Assignment as listed for the volunteer holding it
#[derive(Debug, Clone, Serialize)]
pub struct VolunteerAssignment {
    pub assignment_id: Uuid,
    pub request_id: Uuid,
    pub aid_type: String,
    pub request_status: AidRequestStatus,
    pub origin: AssignmentOrigin,
    pub quantity_assigned: i32,
    pub assignment_date: DateTime<Utc>,
    pub requester: Option<ContactCard>,
    /// Present when the assignment came from a confirmed match
    pub donor: Option<ContactCard>,
}
