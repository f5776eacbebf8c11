//! Admin match discovery and review

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use common::identity::Capability;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::{success, success_list};
use crate::{
    error::ApiResult,
    middleware::AuthUser,
    models::matches::ConfirmMatchPayload,
    state::AppState,
};

/// Run discovery now instead of waiting for the matcher's next tick
pub async fn find(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::DiscoverMatches)?;

    let created = state.engine.discover_matches().await?;
    info!(admin_id = %user.id, created, "Manual match discovery finished");

    Ok(Json(json!({
        "status": "success",
        "message": format!("{created} new potential matches found."),
        "data": { "created": created },
    })))
}

pub async fn pending(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ReviewMatches)?;

    let matches = state.match_repository.pending().await?;

    Ok(success_list(matches))
}

/// Confirm a match, moving quantity and assigning the given volunteer
pub async fn confirm(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ConfirmMatchPayload>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ReviewMatches)?;
    user.require(Capability::AssignVolunteers)?;
    let Json(payload) = payload?;

    let confirmation = state
        .engine
        .confirm_match(id, payload.volunteer_id, user.id)
        .await?;

    Ok(success(confirmation))
}

pub async fn decline(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ReviewMatches)?;

    state.engine.decline_match(id).await?;

    Ok(success(json!({ "match_id": id, "status": "declined" })))
}
