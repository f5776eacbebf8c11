//! Volunteer-facing assignment queries

use matching::models::get_label;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::assignments::{ContactCard, VolunteerAssignment};

/// Assignment repository
#[derive(Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Assignments held by a volunteer, newest first
    ///
    /// Donor contact comes through the assignment's own match, so direct
    /// assignments carry no donor.
    pub async fn for_volunteer(&self, volunteer_id: Uuid) -> sqlx::Result<Vec<VolunteerAssignment>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id AS assignment_id, a.request_id, a.origin, a.quantity_assigned,
                   a.assignment_date,
                   r.aid_type, r.status AS request_status,
                   req_ci.first_name AS requester_first_name,
                   req_ci.last_name AS requester_last_name,
                   req_ci.phone_no AS requester_phone_no,
                   req_ci.street AS requester_street,
                   req_ci.city AS requester_city,
                   don_ci.first_name AS donor_first_name,
                   don_ci.last_name AS donor_last_name,
                   don_ci.phone_no AS donor_phone_no,
                   don_ci.street AS donor_street,
                   don_ci.city AS donor_city
            FROM assignments a
            JOIN aid_requests r ON r.id = a.request_id
            LEFT JOIN contact_info req_ci ON req_ci.user_id = r.requester_id
            LEFT JOIN matches m ON m.id = a.match_id
            LEFT JOIN resources res ON res.id = m.resource_id
            LEFT JOIN contact_info don_ci ON don_ci.user_id = res.donor_id
            WHERE a.volunteer_id = $1
            ORDER BY a.assignment_date DESC
            "#,
        )
        .bind(volunteer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(assignment_from_row).collect()
    }
}

fn assignment_from_row(row: &PgRow) -> sqlx::Result<VolunteerAssignment> {
    Ok(VolunteerAssignment {
        assignment_id: row.try_get("assignment_id")?,
        request_id: row.try_get("request_id")?,
        aid_type: row.try_get("aid_type")?,
        request_status: get_label(row, "request_status")?,
        origin: get_label(row, "origin")?,
        quantity_assigned: row.try_get("quantity_assigned")?,
        assignment_date: row.try_get("assignment_date")?,
        requester: contact_card(row, "requester")?,
        donor: contact_card(row, "donor")?,
    })
}

/// Read a prefixed block of contact columns; absent when the join found nothing
fn contact_card(row: &PgRow, prefix: &str) -> sqlx::Result<Option<ContactCard>> {
    let first_name: Option<String> = row.try_get(format!("{prefix}_first_name").as_str())?;
    let last_name: Option<String> = row.try_get(format!("{prefix}_last_name").as_str())?;

    let (Some(first_name), Some(last_name)) = (first_name, last_name) else {
        return Ok(None);
    };

    Ok(Some(ContactCard {
        first_name,
        last_name,
        phone_no: row.try_get(format!("{prefix}_phone_no").as_str())?,
        street: row.try_get(format!("{prefix}_street").as_str())?,
        city: row.try_get(format!("{prefix}_city").as_str())?,
    }))
}
