use axum::{extract::State, response::Json};
use model::entities::user;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{self, ROLE_USER};
use crate::error::ApiError;
use crate::schemas::{AppState, ErrorResponse};

/// Request body for registering a new user
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Username, must be an email address
    #[validate(email(message = "Username must be a valid email address"))]
    pub username: String,
    /// Password, at least 6 characters
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token response returned by both register and login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
}

/// Register a new user and return a signed access token
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Validation error or username taken", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(&request.username))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        warn!("Registration rejected, username taken: {}", request.username);
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }

    let password_hash = auth::hash_password(&request.password)?;
    let user_model = user::ActiveModel {
        username: Set(request.username.clone()),
        password_hash: Set(password_hash),
        roles: Set(ROLE_USER.to_string()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(
        "User registered with ID: {}, username: {}",
        user_model.id, user_model.username
    );

    let token = state
        .tokens
        .issue(&user_model.username, user_model.role_names())?;
    Ok(Json(AuthResponse {
        access_token: token,
    }))
}

/// Authenticate with username and password, returning a fresh token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user_model = user::Entity::find()
        .filter(user::Column::Username.eq(&request.username))
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("Login failed, unknown username: {}", request.username);
            ApiError::Authentication("Invalid username or password".to_string())
        })?;

    if !auth::verify_password(&request.password, &user_model.password_hash) {
        warn!("Login failed, bad password for: {}", request.username);
        return Err(ApiError::Authentication(
            "Invalid username or password".to_string(),
        ));
    }

    let token = state
        .tokens
        .issue(&user_model.username, user_model.role_names())?;
    Ok(Json(AuthResponse {
        access_token: token,
    }))
}
