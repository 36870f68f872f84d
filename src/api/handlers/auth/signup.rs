use axum::{extract::Extension, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::state::AuthState;
use crate::{
    api::{
        error::{ApiError, ErrorBody},
        handlers::{Data, JsonBody, UserResponse},
    },
    store::{
        models::{DEFAULT_ABOUT, DEFAULT_AVATAR, DEFAULT_NAME},
        schema::{normalize_email, valid_email},
        NewUser, SharedStore,
    },
};

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub about: Option<String>,
    pub avatar: Option<String>,
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User registered", body = Data<UserResponse>),
        (status = 400, description = "Invalid signup payload", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn signup(
    Extension(store): Extension<SharedStore>,
    Extension(auth_state): Extension<Arc<AuthState>>,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> Result<Json<Data<UserResponse>>, ApiError> {
    let email = normalize_email(&payload.email);
    if !valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email".to_string()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }

    let password_hash = auth_state
        .hasher()
        .hash(payload.password)
        .await
        .map_err(ApiError::Internal)?;

    let user = store
        .insert_user(NewUser {
            name: payload.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            about: payload.about.unwrap_or_else(|| DEFAULT_ABOUT.to_string()),
            avatar: payload.avatar.unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            email,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, "User registered");

    Ok(Json(Data::new(UserResponse::from(user))))
}
