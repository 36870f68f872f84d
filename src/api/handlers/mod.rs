pub mod auth;
pub mod cards;
pub mod health;
pub mod users;

// common types for the handlers
use axum::{
    extract::FromRequest,
    http::{header::ALLOW, StatusCode},
    response::{IntoResponse, Response},
};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use utoipa::ToSchema;

use super::error::{ApiError, METHOD_NOT_ALLOWED_MESSAGE, NOT_FOUND_ROUTE_MESSAGE};
use crate::store::{Card, User};

/// Success envelope: every 2xx body is `{"data": ...}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// JSON body extractor whose rejections use the API error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub about: String,
    pub avatar: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name,
            about: user.about,
            avatar: user.avatar,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CardResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub link: String,
    pub owner: String,
    pub likes: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<Card> for CardResponse {
    fn from(card: Card) -> Self {
        Self {
            id: card.id.to_hex(),
            name: card.name,
            link: card.link,
            owner: card.owner.to_hex(),
            likes: card.likes.into_iter().map(ObjectId::to_hex).collect(),
            created_at: card.created_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

/// Parse a path id into a store key before any store access.
pub(crate) fn parse_id(raw: &str, kind: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {kind} id")))
}

// axum fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound(NOT_FOUND_ROUTE_MESSAGE.to_string())
}

/// Give axum's empty `405` the JSON error body, keeping its `Allow` header.
pub async fn method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(ALLOW).cloned();
    let mut json =
        ApiError::MethodNotAllowed(METHOD_NOT_ALLOWED_MESSAGE.to_string()).into_response();
    if let Some(allow) = allow {
        json.headers_mut().insert(ALLOW, allow);
    }
    json
}
