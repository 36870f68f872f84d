//! User profile endpoints.
//!
//! Flow Overview:
//! 1) The session guard has already attached the [`Principal`].
//! 2) Path ids are parsed before the store is touched.
//! 3) Updates are scoped to the principal and re-validated by the store.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::{auth::Principal, parse_id, Data, JsonBody, UserResponse};
use crate::{
    api::error::{ApiError, ErrorBody},
    store::{ProfileUpdate, SharedStore},
};

/// Either field may be omitted; omitted fields keep their stored value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub about: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AvatarRequest {
    pub avatar: String,
}

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = Data<Vec<UserResponse>>),
        (status = 401, description = "Missing or invalid session cookie", body = ErrorBody),
    ),
    tag = "users"
)]
pub async fn list_users(
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Data<Vec<UserResponse>>>, ApiError> {
    let users = store.list_users().await?;
    Ok(Json(Data::new(
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "The signed-in user", body = Data<UserResponse>),
        (status = 401, description = "Missing or invalid session cookie", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    tag = "users"
)]
pub async fn get_me(
    Extension(principal): Extension<Principal>,
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Data<UserResponse>>, ApiError> {
    let user = store.find_user(principal.user_id).await?;
    Ok(Json(Data::new(UserResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/users/{userId}",
    params(("userId" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User detail", body = Data<UserResponse>),
        (status = 400, description = "Invalid user id", body = ErrorBody),
        (status = 401, description = "Missing or invalid session cookie", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    tag = "users"
)]
pub async fn get_user(
    Path(user_id): Path<String>,
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Data<UserResponse>>, ApiError> {
    let user_id = parse_id(&user_id, "user")?;
    let user = store.find_user(user_id).await?;
    Ok(Json(Data::new(UserResponse::from(user))))
}

#[utoipa::path(
    patch,
    path = "/users/me",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = Data<UserResponse>),
        (status = 400, description = "Invalid name or about", body = ErrorBody),
        (status = 401, description = "Missing or invalid session cookie", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    tag = "users"
)]
#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn update_profile(
    Extension(principal): Extension<Principal>,
    Extension(store): Extension<SharedStore>,
    JsonBody(payload): JsonBody<ProfileRequest>,
) -> Result<Json<Data<UserResponse>>, ApiError> {
    let user = store
        .update_profile(
            principal.user_id,
            ProfileUpdate {
                name: payload.name,
                about: payload.about,
            },
        )
        .await?;

    info!("Profile updated");

    Ok(Json(Data::new(UserResponse::from(user))))
}

#[utoipa::path(
    patch,
    path = "/users/me/avatar",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = Data<UserResponse>),
        (status = 400, description = "Avatar is not a valid URL", body = ErrorBody),
        (status = 401, description = "Missing or invalid session cookie", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    tag = "users"
)]
#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn update_avatar(
    Extension(principal): Extension<Principal>,
    Extension(store): Extension<SharedStore>,
    JsonBody(payload): JsonBody<AvatarRequest>,
) -> Result<Json<Data<UserResponse>>, ApiError> {
    let user = store
        .update_avatar(principal.user_id, payload.avatar)
        .await?;

    info!("Avatar updated");

    Ok(Json(Data::new(UserResponse::from(user))))
}
