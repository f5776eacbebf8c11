//! Authentication service routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    AppState,
    error::AuthError,
    models::{LoginCredentials, SignupRequest, User, UserView},
    repositories::CreateOutcome,
    validation::validate_signup,
};

const BAD_CREDENTIALS: &str = "Incorrect email or password";

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/auth/signup", post(signup))
        .route("/api/v1/auth/login", post(login))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Register a new account and sign it in
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload.map_err(|e| AuthError::BadRequest(e.body_text()))?;
    let new_user = validate_signup(&payload).map_err(AuthError::BadRequest)?;

    let user = match state.user_repository.create(&new_user).await {
        Ok(CreateOutcome::Created(user)) => user,
        Ok(CreateOutcome::EmailTaken) => {
            return Err(AuthError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        Err(e) => {
            error!("Failed to create user: {}", e);
            return Err(AuthError::Internal);
        }
    };

    info!("Registered user {} as {}", user.id, user.role);

    Ok((StatusCode::CREATED, token_response(&state, &user)?))
}

/// Exchange email and password for a token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginCredentials>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(credentials) = payload.map_err(|e| AuthError::BadRequest(e.body_text()))?;

    let email = credentials.email.trim().to_ascii_lowercase();
    if email.is_empty() || credentials.password.is_empty() {
        return Err(AuthError::BadRequest(
            "Please provide email and password".to_string(),
        ));
    }

    if let Some(remaining) = state.login_throttle.locked_for(&email).await {
        warn!("Rejecting login for locked-out account {}", email);
        return Err(AuthError::TooManyRequests {
            retry_after: remaining.as_secs().max(1),
        });
    }

    let user = state.user_repository.find_by_email(&email).await.map_err(|e| {
        error!("Failed to look up user: {}", e);
        AuthError::Internal
    })?;

    let verified = match &user {
        Some(user) => state
            .user_repository
            .verify_password(user, &credentials.password)
            .map_err(|e| {
                error!("Failed to verify password: {}", e);
                AuthError::Internal
            })?,
        None => false,
    };

    let user = match user {
        Some(user) if verified => user,
        _ => {
            state.login_throttle.record_failure(&email).await;
            return Err(AuthError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }
    };

    state.login_throttle.clear(&email).await;
    info!("User {} logged in", user.id);

    Ok((StatusCode::OK, token_response(&state, &user)?))
}

fn token_response(state: &AppState, user: &User) -> Result<Json<serde_json::Value>, AuthError> {
    let token = state
        .jwt_service
        .issue_token(user.id, user.role)
        .map_err(|e| {
            error!("Failed to issue token: {}", e);
            AuthError::Internal
        })?;

    Ok(Json(json!({
        "status": "success",
        "token": token,
        "expires_in": state.jwt_service.token_expiry(),
        "data": { "user": UserView::from(user) },
    })))
}
