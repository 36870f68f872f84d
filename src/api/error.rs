//! Error taxonomy shared by every handler.
//!
//! Every failure maps to exactly one variant, and every variant renders as a
//! JSON body `{"message": "..."}` with its status code. Internal errors are
//! logged and answered with a generic message.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::store::{Entity, StoreError};

pub const INTERNAL_MESSAGE: &str = "An error occurred on the server";
pub const NOT_FOUND_ROUTE_MESSAGE: &str = "Requested resource not found";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed for this resource";
pub const INVALID_BODY_MESSAGE: &str = "Request body must be valid JSON with the expected fields";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    MethodNotAllowed(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(anyhow::Error),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::Unauthorized("Authorization required".to_string())
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => Self::NotFound(match entity {
                Entity::User => "User not found".to_string(),
                Entity::Card => "Card not found".to_string(),
            }),
            StoreError::Conflict(message) => Self::Conflict(message),
            StoreError::Validation(message) => Self::BadRequest(message),
            StoreError::Backend(err) => Self::Internal(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // serde details stay in the logs
        debug!("Rejected request body: {}", rejection.body_text());
        Self::BadRequest(INVALID_BODY_MESSAGE.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            Self::Internal(err) => {
                error!("Failed to handle request: {err:#}");
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}
