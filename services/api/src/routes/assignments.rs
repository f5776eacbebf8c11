//! Volunteer assignments

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use common::identity::Capability;
use matching::DirectAssignment;
use uuid::Uuid;

use super::{success, success_list};
use crate::{error::ApiResult, middleware::AuthUser, state::AppState};

/// Assign a volunteer to a request directly, without a match
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<DirectAssignment>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::AssignVolunteers)?;
    let Json(payload) = payload?;

    let assignment = state.engine.assign_volunteer(&payload, user.id).await?;

    Ok((StatusCode::CREATED, success(assignment)))
}

pub async fn mine(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ViewOwnAssignments)?;

    let assignments = state.assignment_repository.for_volunteer(user.id).await?;

    Ok(success_list(assignments))
}

pub async fn complete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::CompleteAssignment)?;

    let completed = state.engine.complete_assignment(id, user.id).await?;

    Ok(success(completed))
}
