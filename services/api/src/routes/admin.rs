//! Admin user management, analytics and moderation

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use common::identity::Capability;
use serde_json::json;
use uuid::Uuid;

use super::{success, success_list};
use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{requests::UrgencyUpdate, resources::ResourceCandidate, users::RoleUpdate},
    state::AppState,
};

pub async fn users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ManageUsers)?;

    let users = state.user_repository.list().await?;

    Ok(success_list(users))
}

pub async fn update_role(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<RoleUpdate>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ManageUsers)?;
    let Json(payload) = payload?;
    let role = payload.validate().map_err(ApiError::BadRequest)?;

    let updated = state
        .user_repository
        .update_role(id, role)
        .await?
        .ok_or_else(|| no_user(id))?;

    Ok(success(json!({ "user": updated })))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ManageUsers)?;

    if !state.user_repository.delete(id).await? {
        return Err(no_user(id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Request counts per aid type
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ModerateContent)?;

    let counts = state.aid_request_repository.count_by_type().await?;

    Ok(success(counts))
}

/// Resources with stock whose type matches the request's aid type
pub async fn candidate_resources(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ReviewMatches)?;

    let request = state
        .aid_request_repository
        .find(id)
        .await?
        .ok_or_else(|| no_request(id))?;

    let candidates: Vec<ResourceCandidate> = state
        .resource_repository
        .available_of_type(&request.aid_type)
        .await?
        .into_iter()
        .map(|resource| ResourceCandidate::new(resource, request.location))
        .collect();

    Ok(success_list(candidates))
}

pub async fn set_urgency(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UrgencyUpdate>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ModerateContent)?;
    let Json(payload) = payload?;

    let updated = state
        .aid_request_repository
        .set_urgency(id, payload.urgency)
        .await?
        .ok_or_else(|| no_request(id))?;

    Ok(success(updated))
}

pub async fn delete_request(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ModerateContent)?;

    state.engine.delete_request(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn no_user(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("user not found: {id}"))
}

fn no_request(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("aid request not found: {id}"))
}
