//! Authentication API Endpoints
//! Mission: Provide registration, login and logout endpoints

use crate::api::error::json_body;
use crate::auth::{
    models::{AuthenticatedUser, LoginRequest, LoginResponse, RegisterRequest, UserResponse},
    user_store::UserStore,
};
use crate::error::ServiceError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub min_password_length: usize,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, min_password_length: usize) -> Self {
        Self {
            user_store,
            min_password_length,
        }
    }
}

/// Register endpoint - POST /api/register/
pub async fn register(
    State(state): State<AuthState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ServiceError> {
    let payload = json_body(payload)?;
    payload.validate(state.min_password_length)?;

    let user = state.user_store.create_user(
        payload.username.trim(),
        payload.email.trim(),
        &payload.password,
    )?;

    info!("Registered user: {}", user.username);
    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// Login endpoint - POST /api/login/
pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let payload = json_body(payload)?;
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(ServiceError::validation("Username and password are required."));
    }

    info!("Login attempt: {}", username);

    let Some(user) = state
        .user_store
        .verify_password(username, &payload.password)?
    else {
        warn!("Failed login attempt: {}", username);
        return Err(ServiceError::Unauthorized(
            "Unable to log in with provided credentials.".to_string(),
        ));
    };

    let token = state.user_store.token_for_user(&user.id)?;

    info!("Login successful: {}", user.username);
    Ok(Json(LoginResponse { token: token.key }))
}

/// Logout endpoint - POST /api/logout/ (token required)
pub async fn logout(
    State(state): State<AuthState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Value>, ServiceError> {
    if !state.user_store.delete_token(&user.token)? {
        // Lost a race with another logout of the same token
        return Err(ServiceError::Unauthorized("Invalid token.".to_string()));
    }

    info!("Logged out: {}", user.username);
    Ok(Json(json!({ "message": "Logged out successfully" })))
}
