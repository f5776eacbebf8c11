//! Signed-in user's own profile

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::success;
use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::users::ContactInfoPayload,
    state::AppState,
};

pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .user_repository
        .profile(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(success(json!({ "user": profile })))
}

pub async fn contact_info(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let contact = state.user_repository.contact_info(user.id).await?;

    Ok(success(json!({ "contact_info": contact })))
}

/// Create or replace the caller's contact info
pub async fn save_contact_info(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ContactInfoPayload>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let contact = payload.validate().map_err(ApiError::BadRequest)?;

    let saved = state
        .user_repository
        .upsert_contact_info(user.id, &contact)
        .await?;

    Ok((StatusCode::CREATED, success(json!({ "contact_info": saved }))))
}
