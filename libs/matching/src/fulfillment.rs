//! Match confirmation and the quantity transfer it performs
//!
//! Confirming a match moves `min(outstanding, available)` units from the
//! resource to the request and hands them to a volunteer. The match, request
//! and resource rows are locked with `FOR UPDATE` for the lifetime of the
//! transaction, always in that order, so two admins confirming against the
//! same resource are serialized and cannot both spend the same units.

use serde::Serialize;
use sqlx::Row;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::{MatchingEngine, require_volunteer};
use crate::error::{MatchingError, MatchingResult};
use crate::models::{AidRequestStatus, get_label};

/// Outcome of a transfer between a request and a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlan {
    /// Units moved from the resource to the request
    pub transferred: i32,
    /// Request outstanding quantity after the transfer
    pub remaining_outstanding: i32,
    /// Resource quantity after the transfer
    pub remaining_available: i32,
    /// Request status after the transfer
    pub request_status: AidRequestStatus,
}

/// Work out a transfer, or `None` when no unit can move
pub fn plan_transfer(outstanding: i32, available: i32) -> Option<TransferPlan> {
    let transferred = outstanding.min(available);
    if transferred <= 0 {
        return None;
    }

    let remaining_outstanding = outstanding - transferred;
    let request_status = if remaining_outstanding == 0 {
        AidRequestStatus::Assigned
    } else {
        AidRequestStatus::Pending
    };

    Some(TransferPlan {
        transferred,
        remaining_outstanding,
        remaining_available: available - transferred,
        request_status,
    })
}

/// Result of a successful confirmation
#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    pub match_id: Uuid,
    pub request_id: Uuid,
    pub resource_id: Uuid,
    pub assignment_id: Uuid,
    pub transferred: i32,
    pub remaining_outstanding: i32,
    pub request_status: AidRequestStatus,
}

impl MatchingEngine {
    /// Confirm a pending match, transfer quantity and assign a volunteer
    pub async fn confirm_match(
        &self,
        match_id: Uuid,
        volunteer_id: Uuid,
        admin_id: Uuid,
    ) -> MatchingResult<Confirmation> {
        let mut tx = self.pool.begin().await?;

        let pending = sqlx::query(
            r#"
            SELECT request_id, resource_id
            FROM matches
            WHERE id = $1 AND status = 'pending'
            FOR UPDATE
            "#,
        )
        .bind(match_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| MatchingError::not_found("pending match", match_id))?;

        let request_id: Uuid = pending.try_get("request_id")?;
        let resource_id: Uuid = pending.try_get("resource_id")?;

        let request = sqlx::query(
            r#"
            SELECT outstanding_quantity, status
            FROM aid_requests
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        let status: AidRequestStatus = get_label(&request, "status")?;
        if matches!(
            status,
            AidRequestStatus::Cancelled | AidRequestStatus::Fulfilled
        ) {
            return Err(MatchingError::not_found("open aid request", request_id));
        }
        let outstanding: i32 = request.try_get("outstanding_quantity")?;

        let available: i32 = sqlx::query_scalar(
            r#"
            SELECT quantity
            FROM resources
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(resource_id)
        .fetch_one(&mut *tx)
        .await?;

        let Some(plan) = plan_transfer(outstanding, available) else {
            warn!(%match_id, outstanding, available, "Nothing to transfer for match");
            return Err(MatchingError::InsufficientQuantity {
                request_id,
                resource_id,
                outstanding,
                available,
            });
        };

        require_volunteer(&mut *tx, volunteer_id).await?;

        sqlx::query("UPDATE resources SET quantity = quantity - $1 WHERE id = $2")
            .bind(plan.transferred)
            .bind(resource_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE aid_requests
            SET outstanding_quantity = outstanding_quantity - $1, status = $2
            WHERE id = $3
            "#,
        )
        .bind(plan.transferred)
        .bind(plan.request_status.as_str())
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE matches SET status = 'confirmed', updated_at = NOW() WHERE id = $1")
            .bind(match_id)
            .execute(&mut *tx)
            .await?;

        let assignment_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO assignments
                (request_id, volunteer_id, assigned_by_admin_id, match_id, origin, quantity_assigned)
            VALUES ($1, $2, $3, $4, 'match', $5)
            RETURNING id
            "#,
        )
        .bind(request_id)
        .bind(volunteer_id)
        .bind(admin_id)
        .bind(match_id)
        .bind(plan.transferred)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            %match_id,
            %request_id,
            %resource_id,
            %assignment_id,
            transferred = plan.transferred,
            request_status = %plan.request_status,
            "Match confirmed"
        );

        Ok(Confirmation {
            match_id,
            request_id,
            resource_id,
            assignment_id,
            transferred: plan.transferred,
            remaining_outstanding: plan.remaining_outstanding,
            request_status: plan.request_status,
        })
    }

    /// Decline a pending match; the pair is never proposed again
    pub async fn decline_match(&self, match_id: Uuid) -> MatchingResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE matches
            SET status = 'declined', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(match_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MatchingError::not_found("pending match", match_id));
        }

        info!(%match_id, "Match declined");
        Ok(())
    }

    /// Hard-delete an aid request with its matches and assignments
    ///
    /// The request's matches are locked before the request itself, the same
    /// order `confirm_match` takes, so a concurrent confirmation waits
    /// instead of deadlocking against the cascade.
    pub async fn delete_request(&self, request_id: Uuid) -> MatchingResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM matches WHERE request_id = $1 ORDER BY id FOR UPDATE")
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM aid_requests WHERE id = $1")
            .bind(request_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(MatchingError::not_found("aid request", request_id));
        }

        tx.commit().await?;

        info!(%request_id, "Aid request deleted");
        Ok(())
    }
}
