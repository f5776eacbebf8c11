//! Donor resource endpoints

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use common::identity::Capability;

use super::{success, success_list};
use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::resources::NewResourcePayload,
    state::AppState,
};

pub async fn list(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let resources = state.resource_repository.list().await?;

    Ok(success_list(resources))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewResourcePayload>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::PostResource)?;
    let Json(payload) = payload?;
    let resource = payload.validate().map_err(ApiError::BadRequest)?;

    let created = state.resource_repository.create(user.id, &resource).await?;

    Ok((StatusCode::CREATED, success(created)))
}
