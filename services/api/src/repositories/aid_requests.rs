//! Aid request persistence

use matching::models::{AidRequest, AidRequestStatus, Urgency};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::{
    admin::AidTypeCount,
    requests::{
        AidRequestChanges, AidRequestFilter, AidRequestListing, NewAidRequest, contains_pattern,
    },
};

/// Aid request repository
#[derive(Clone)]
pub struct AidRequestRepository {
    pool: PgPool,
}

impl AidRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Public listing, newest first; every `None` filter field matches everything
    pub async fn list(&self, filter: &AidRequestFilter) -> sqlx::Result<Vec<AidRequestListing>> {
        let rows = sqlx::query(
            r#"
            SELECT ar.id, ar.requester_id, ar.aid_type, ar.requested_quantity,
                   ar.outstanding_quantity, ar.urgency, ar.status, ar.latitude,
                   ar.longitude, ar.request_date,
                   u.email, ci.first_name, ci.last_name
            FROM aid_requests ar
            JOIN users u ON u.id = ar.requester_id
            LEFT JOIN contact_info ci ON ci.user_id = ar.requester_id
            WHERE ($1::text IS NULL OR ar.urgency = $1)
              AND ($2::text IS NULL OR ar.status = $2)
              AND ($3::text IS NULL OR ar.aid_type ILIKE $3)
              AND ($4::text IS NULL
                   OR ci.first_name ILIKE $4
                   OR ci.last_name ILIKE $4
                   OR u.email ILIKE $4)
            ORDER BY ar.request_date DESC
            "#,
        )
        .bind(filter.urgency.map(Urgency::as_str))
        .bind(filter.status.map(AidRequestStatus::as_str))
        .bind(filter.aid_type.as_deref().map(contains_pattern))
        .bind(filter.search.as_deref().map(contains_pattern))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> sqlx::Result<AidRequestListing> {
                Ok(AidRequestListing {
                    request: AidRequest::from_row(row)?,
                    email: row.try_get("email")?,
                    first_name: row.try_get("first_name")?,
                    last_name: row.try_get("last_name")?,
                })
            })
            .collect()
    }

    pub async fn find(&self, id: Uuid) -> sqlx::Result<Option<AidRequest>> {
        let query = format!("SELECT {} FROM aid_requests WHERE id = $1", AidRequest::COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(AidRequest::from_row).transpose()
    }

    /// Post a request; the whole quantity starts outstanding
    pub async fn create(&self, requester_id: Uuid, request: &NewAidRequest) -> sqlx::Result<AidRequest> {
        let query = format!(
            r#"
            INSERT INTO aid_requests
                (requester_id, aid_type, requested_quantity, outstanding_quantity, urgency, latitude, longitude)
            VALUES ($1, $2, $3, $3, $4, $5, $6)
            RETURNING {}
            "#,
            AidRequest::COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(requester_id)
            .bind(&request.aid_type)
            .bind(request.quantity)
            .bind(request.urgency.as_str())
            .bind(request.location.map(|l| l.latitude))
            .bind(request.location.map(|l| l.longitude))
            .fetch_one(&self.pool)
            .await?;

        let created = AidRequest::from_row(&row)?;
        info!(
            "Requester {} posted aid request {} for {} x {}",
            requester_id, created.id, created.requested_quantity, created.aid_type
        );

        Ok(created)
    }

    pub async fn list_for_requester(&self, requester_id: Uuid) -> sqlx::Result<Vec<AidRequest>> {
        let query = format!(
            "SELECT {} FROM aid_requests WHERE requester_id = $1 ORDER BY request_date DESC",
            AidRequest::COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(requester_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(AidRequest::from_row).collect()
    }

    /// Apply changes to a request that is still pending
    ///
    /// Returns `None` when the request no longer exists or has left `pending`.
    pub async fn update_pending(
        &self,
        id: Uuid,
        changes: &AidRequestChanges,
    ) -> sqlx::Result<Option<AidRequest>> {
        let query = format!(
            r#"
            UPDATE aid_requests
            SET urgency = COALESCE($1, urgency),
                latitude = COALESCE($2, latitude),
                longitude = COALESCE($3, longitude)
            WHERE id = $4 AND status = 'pending'
            RETURNING {}
            "#,
            AidRequest::COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(changes.urgency.map(Urgency::as_str))
            .bind(changes.location.map(|l| l.latitude))
            .bind(changes.location.map(|l| l.longitude))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(AidRequest::from_row).transpose()
    }

    /// Cancel a request that is not yet fulfilled
    pub async fn cancel(&self, id: Uuid) -> sqlx::Result<Option<AidRequest>> {
        let query = format!(
            r#"
            UPDATE aid_requests
            SET status = 'cancelled'
            WHERE id = $1 AND status IN ('pending', 'assigned')
            RETURNING {}
            "#,
            AidRequest::COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(AidRequest::from_row).transpose()
    }

    pub async fn set_urgency(&self, id: Uuid, urgency: Urgency) -> sqlx::Result<Option<AidRequest>> {
        let query = format!(
            "UPDATE aid_requests SET urgency = $1 WHERE id = $2 RETURNING {}",
            AidRequest::COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(urgency.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(AidRequest::from_row).transpose()
    }

    /// Request counts per aid type, most requested first
    pub async fn count_by_type(&self) -> sqlx::Result<Vec<AidTypeCount>> {
        let rows = sqlx::query(
            r#"
            SELECT aid_type, COUNT(*) AS request_count
            FROM aid_requests
            GROUP BY aid_type
            ORDER BY request_count DESC, aid_type ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> sqlx::Result<AidTypeCount> {
                Ok(AidTypeCount {
                    aid_type: row.try_get("aid_type")?,
                    request_count: row.try_get("request_count")?,
                })
            })
            .collect()
    }
}
