//! Direct volunteer assignment by an admin, outside of a match
//!
//! A direct assignment records who delivers a request; it does not move any
//! quantity. Each volunteer can be directly assigned to a request once.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::engine::{MatchingEngine, require_volunteer};
use crate::error::{MatchingError, MatchingResult};
use crate::models::Assignment;

/// Input for a direct assignment
#[derive(Debug, Clone, Deserialize)]
pub struct DirectAssignment {
    pub request_id: Uuid,
    pub volunteer_id: Uuid,
    /// Units the volunteer is responsible for; defaults to the outstanding quantity
    pub quantity: Option<i32>,
}

impl MatchingEngine {
    /// Assign a volunteer to a request without going through a match
    pub async fn assign_volunteer(
        &self,
        input: &DirectAssignment,
        admin_id: Uuid,
    ) -> MatchingResult<Assignment> {
        let mut tx = self.pool.begin().await?;

        let quantities: Option<(i32, i32)> = sqlx::query_as(
            "SELECT requested_quantity, outstanding_quantity FROM aid_requests WHERE id = $1",
        )
        .bind(input.request_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (requested, outstanding) =
            quantities.ok_or_else(|| MatchingError::not_found("aid request", input.request_id))?;

        require_volunteer(&mut *tx, input.volunteer_id).await?;

        let quantity = input.quantity.unwrap_or(outstanding.max(1));
        if quantity < 1 || quantity > requested {
            return Err(MatchingError::Validation(format!(
                "quantity must be between 1 and {requested}, got {quantity}"
            )));
        }

        let query = format!(
            r#"
            INSERT INTO assignments
                (request_id, volunteer_id, assigned_by_admin_id, origin, quantity_assigned)
            VALUES ($1, $2, $3, 'direct', $4)
            RETURNING {}
            "#,
            Assignment::COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(input.request_id)
            .bind(input.volunteer_id)
            .bind(admin_id)
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if common::error::is_unique_violation(&e) {
                    MatchingError::Conflict(format!(
                        "volunteer {} is already assigned to request {}",
                        input.volunteer_id, input.request_id
                    ))
                } else {
                    MatchingError::Database(e)
                }
            })?;
        let assignment = Assignment::from_row(&row)?;

        tx.commit().await?;

        info!(
            assignment_id = %assignment.id,
            request_id = %assignment.request_id,
            volunteer_id = %assignment.volunteer_id,
            "Volunteer assigned directly"
        );
        Ok(assignment)
    }
}
