//! Aid request endpoints for the public and for requesters

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use common::identity::Capability;
use matching::models::AidRequest;
use uuid::Uuid;

use super::{success, success_list};
use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::requests::{AidRequestQuery, AidRequestUpdate, NewAidRequestPayload},
    state::AppState,
};

/// Public listing with optional `urgency`, `status`, `type` and `search` filters
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<AidRequestQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let filter = query.validate().map_err(ApiError::BadRequest)?;

    let requests = state.aid_request_repository.list(&filter).await?;

    Ok(success_list(requests))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewAidRequestPayload>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::PostAidRequest)?;
    let Json(payload) = payload?;
    let request = payload.validate().map_err(ApiError::BadRequest)?;

    let created = state
        .aid_request_repository
        .create(user.id, &request)
        .await?;

    Ok((StatusCode::CREATED, success(created)))
}

/// The caller's own requests, newest first
pub async fn mine(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ManageOwnAidRequests)?;

    let requests = state
        .aid_request_repository
        .list_for_requester(user.id)
        .await?;

    Ok(success_list(requests))
}

/// Change urgency or location of one's own pending request
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<AidRequestUpdate>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ManageOwnAidRequests)?;
    let Json(payload) = payload?;
    let changes = payload.validate().map_err(ApiError::BadRequest)?;

    owned_request(&state, &user, id).await?;

    let updated = state
        .aid_request_repository
        .update_pending(id, &changes)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("Only pending requests can be changed".to_string())
        })?;

    Ok(success(updated))
}

/// Cancel one's own request
pub async fn cancel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ManageOwnAidRequests)?;

    owned_request(&state, &user, id).await?;

    let cancelled = state
        .aid_request_repository
        .cancel(id)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("Fulfilled or cancelled requests cannot be cancelled".to_string())
        })?;

    Ok(success(cancelled))
}

async fn owned_request(state: &AppState, user: &AuthUser, id: Uuid) -> ApiResult<AidRequest> {
    let request = state
        .aid_request_repository
        .find(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("aid request not found: {id}")))?;

    if request.requester_id != user.id {
        return Err(ApiError::Forbidden(
            "You can only change your own requests".to_string(),
        ));
    }

    Ok(request)
}
