//! Volunteer-side completion of an assignment

use serde::Serialize;
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use crate::engine::MatchingEngine;
use crate::error::{MatchingError, MatchingResult};
use crate::models::AidRequestStatus;

/// Result of completing an assignment
#[derive(Debug, Clone, Serialize)]
pub struct CompletedAssignment {
    pub assignment_id: Uuid,
    pub request_id: Uuid,
    pub request_status: AidRequestStatus,
}

impl MatchingEngine {
    /// Mark the request behind an assignment as fulfilled
    ///
    /// Only the volunteer the assignment belongs to may complete it. The
    /// ownership check and the status update share one transaction.
    pub async fn complete_assignment(
        &self,
        assignment_id: Uuid,
        volunteer_id: Uuid,
    ) -> MatchingResult<CompletedAssignment> {
        let mut tx = self.pool.begin().await?;

        let assignment = sqlx::query(
            r#"
            SELECT request_id, volunteer_id
            FROM assignments
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(assignment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| MatchingError::not_found("assignment", assignment_id))?;

        let owner: Uuid = assignment.try_get("volunteer_id")?;
        if owner != volunteer_id {
            return Err(MatchingError::Forbidden(format!(
                "assignment {assignment_id} is not assigned to volunteer {volunteer_id}"
            )));
        }
        let request_id: Uuid = assignment.try_get("request_id")?;

        sqlx::query("UPDATE aid_requests SET status = $1 WHERE id = $2")
            .bind(AidRequestStatus::Fulfilled.as_str())
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(%assignment_id, %request_id, %volunteer_id, "Assignment completed");

        Ok(CompletedAssignment {
            assignment_id,
            request_id,
            request_status: AidRequestStatus::Fulfilled,
        })
    }
}
