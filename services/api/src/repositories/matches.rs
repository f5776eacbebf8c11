//! Read side of candidate matches

use sqlx::{PgPool, Row, postgres::PgRow};

use crate::models::matches::PendingMatch;

/// Match repository
#[derive(Clone)]
pub struct MatchRepository {
    pool: PgPool,
}

impl MatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pending matches with the quantities an admin needs to decide, oldest first
    pub async fn pending(&self) -> sqlx::Result<Vec<PendingMatch>> {
        let rows = sqlx::query(
            r#"
            SELECT m.id AS match_id, m.created_at,
                   r.id AS request_id, r.aid_type, r.outstanding_quantity,
                   u_req.email AS requester_email,
                   res.id AS resource_id, res.quantity AS available_quantity,
                   u_don.email AS donor_email
            FROM matches m
            JOIN aid_requests r ON r.id = m.request_id
            JOIN resources res ON res.id = m.resource_id
            JOIN users u_req ON u_req.id = r.requester_id
            JOIN users u_don ON u_don.id = res.donor_id
            WHERE m.status = 'pending'
            ORDER BY m.created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(pending_from_row).collect()
    }
}

fn pending_from_row(row: &PgRow) -> sqlx::Result<PendingMatch> {
    Ok(PendingMatch {
        match_id: row.try_get("match_id")?,
        request_id: row.try_get("request_id")?,
        aid_type: row.try_get("aid_type")?,
        outstanding_quantity: row.try_get("outstanding_quantity")?,
        requester_email: row.try_get("requester_email")?,
        resource_id: row.try_get("resource_id")?,
        available_quantity: row.try_get("available_quantity")?,
        donor_email: row.try_get("donor_email")?,
        created_at: row.try_get("created_at")?,
    })
}
