//! Session cookie handling and the guard in front of protected routes.

use axum::{
    extract::{Extension, Request},
    http::{
        header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

use super::{
    principal::Principal,
    state::{AuthConfig, AuthState},
};
use crate::api::error::ApiError;

pub const SESSION_COOKIE_NAME: &str = "jwt";

#[derive(Debug, Serialize, ToSchema)]
pub struct SignoutResponse {
    pub message: String,
}

/// Reject requests without a valid session cookie; otherwise attach the
/// [`Principal`] to the request extensions.
///
/// # Errors
/// Returns `401` when the cookie is missing, forged, expired or does not
/// carry a user id.
pub async fn require_session(
    Extension(auth_state): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(request.headers()).ok_or_else(ApiError::unauthorized)?;

    let claims = auth_state.verify_token(&token).map_err(|err| {
        debug!("Rejected session token: {err:#}");
        ApiError::unauthorized()
    })?;

    let user_id = ObjectId::parse_str(&claims.sub).map_err(|_| ApiError::unauthorized())?;

    request.extensions_mut().insert(Principal { user_id });

    Ok(next.run(request).await)
}

#[utoipa::path(
    post,
    path = "/signout",
    responses(
        (status = 200, description = "Session cookie cleared", body = SignoutResponse)
    ),
    tag = "auth"
)]
pub async fn signout(Extension(auth_state): Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Always clear the cookie, there is no server-side session to revoke.
    let mut headers = HeaderMap::new();
    match clear_session_cookie(auth_state.config()) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }
    (
        headers,
        Json(SignoutResponse {
            message: "Signed out".to_string(),
        }),
    )
}

/// Build the `HttpOnly` cookie carrying the session token.
pub(super) fn session_cookie(
    auth_state: &AuthState,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = auth_state.config().session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={ttl_seconds}"
    );
    if auth_state.config().session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(auth_config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if auth_config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == SESSION_COOKIE_NAME).then(|| val.trim().to_string())
        })
        .find(|token| !token.is_empty())
}
