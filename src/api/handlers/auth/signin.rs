use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use super::{session::session_cookie, state::AuthState};
use crate::{
    api::{
        error::{ApiError, ErrorBody},
        handlers::{Data, JsonBody, UserResponse},
    },
    store::{
        schema::{normalize_email, valid_email},
        SharedStore, StoreError,
    },
};

#[derive(Deserialize, ToSchema)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

fn bad_credentials() -> ApiError {
    ApiError::Unauthorized("Incorrect email or password".to_string())
}

#[utoipa::path(
    post,
    path = "/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = Data<UserResponse>),
        (status = 400, description = "Invalid signin payload", body = ErrorBody),
        (status = 401, description = "Incorrect email or password", body = ErrorBody),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn signin(
    Extension(store): Extension<SharedStore>,
    Extension(auth_state): Extension<Arc<AuthState>>,
    JsonBody(payload): JsonBody<SigninRequest>,
) -> Result<(HeaderMap, Json<Data<UserResponse>>), ApiError> {
    let email = normalize_email(&payload.email);
    if !valid_email(&email) || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    // Unknown email and wrong password answer the same way.
    let credentials = match store.find_credentials(&email).await {
        Ok(credentials) => credentials,
        Err(StoreError::NotFound(_)) => {
            debug!("Signin for unknown email");
            return Err(bad_credentials());
        }
        Err(err) => return Err(err.into()),
    };

    let matched = auth_state
        .hasher()
        .verify(payload.password, credentials.password_hash)
        .await
        .map_err(ApiError::Internal)?;
    if !matched {
        debug!(user_id = %credentials.user.id, "Signin with wrong password");
        return Err(bad_credentials());
    }

    let token = auth_state
        .issue_token(credentials.user.id)
        .map_err(ApiError::Internal)?;
    let cookie = session_cookie(&auth_state, &token)
        .map_err(|err| ApiError::Internal(anyhow::Error::new(err)))?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    info!(user_id = %credentials.user.id, "User signed in");

    Ok((headers, Json(Data::new(UserResponse::from(credentials.user)))))
}
