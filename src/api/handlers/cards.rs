//! Card endpoints.
//!
//! Deleting requires ownership; liking and unliking are open to every
//! signed-in user and are idempotent.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::{auth::Principal, parse_id, CardResponse, Data, JsonBody};
use crate::{
    api::error::{ApiError, ErrorBody},
    store::{NewCard, SharedStore},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CardRequest {
    pub name: String,
    pub link: String,
}

#[utoipa::path(
    get,
    path = "/cards",
    responses(
        (status = 200, description = "All cards", body = Data<Vec<CardResponse>>),
        (status = 401, description = "Missing or invalid session cookie", body = ErrorBody),
    ),
    tag = "cards"
)]
pub async fn list_cards(
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Data<Vec<CardResponse>>>, ApiError> {
    let cards = store.list_cards().await?;
    Ok(Json(Data::new(
        cards.into_iter().map(CardResponse::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/cards",
    request_body = CardRequest,
    responses(
        (status = 200, description = "Card created", body = Data<CardResponse>),
        (status = 400, description = "Invalid name or link", body = ErrorBody),
        (status = 401, description = "Missing or invalid session cookie", body = ErrorBody),
    ),
    tag = "cards"
)]
#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn create_card(
    Extension(principal): Extension<Principal>,
    Extension(store): Extension<SharedStore>,
    JsonBody(payload): JsonBody<CardRequest>,
) -> Result<Json<Data<CardResponse>>, ApiError> {
    let card = store
        .insert_card(NewCard {
            name: payload.name,
            link: payload.link,
            owner: principal.user_id,
        })
        .await?;

    info!(card_id = %card.id, "Card created");

    Ok(Json(Data::new(CardResponse::from(card))))
}

#[utoipa::path(
    delete,
    path = "/cards/{cardId}",
    params(("cardId" = String, Path, description = "Card id")),
    responses(
        (status = 200, description = "Card deleted, the removed card is returned", body = Data<CardResponse>),
        (status = 400, description = "Invalid card id", body = ErrorBody),
        (status = 401, description = "Missing or invalid session cookie", body = ErrorBody),
        (status = 403, description = "Card belongs to another user", body = ErrorBody),
        (status = 404, description = "Card not found", body = ErrorBody),
    ),
    tag = "cards"
)]
#[instrument(skip_all, fields(user_id = %principal.user_id, card_id = %card_id))]
pub async fn delete_card(
    Path(card_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Data<CardResponse>>, ApiError> {
    let card_id = parse_id(&card_id, "card")?;

    let card = store.find_card(card_id).await?;
    principal.ensure_owns(&card)?;

    let deleted = store.delete_card(card_id).await?;

    info!("Card deleted");

    Ok(Json(Data::new(CardResponse::from(deleted))))
}

#[utoipa::path(
    put,
    path = "/cards/{cardId}/likes",
    params(("cardId" = String, Path, description = "Card id")),
    responses(
        (status = 200, description = "Like added (no-op when already liked)", body = Data<CardResponse>),
        (status = 400, description = "Invalid card id", body = ErrorBody),
        (status = 401, description = "Missing or invalid session cookie", body = ErrorBody),
        (status = 404, description = "Card not found", body = ErrorBody),
    ),
    tag = "cards"
)]
pub async fn like_card(
    Path(card_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Data<CardResponse>>, ApiError> {
    let card_id = parse_id(&card_id, "card")?;
    let card = store.add_like(card_id, principal.user_id).await?;
    Ok(Json(Data::new(CardResponse::from(card))))
}

#[utoipa::path(
    delete,
    path = "/cards/{cardId}/likes",
    params(("cardId" = String, Path, description = "Card id")),
    responses(
        (status = 200, description = "Like removed (no-op when not liked)", body = Data<CardResponse>),
        (status = 400, description = "Invalid card id", body = ErrorBody),
        (status = 401, description = "Missing or invalid session cookie", body = ErrorBody),
        (status = 404, description = "Card not found", body = ErrorBody),
    ),
    tag = "cards"
)]
pub async fn unlike_card(
    Path(card_id): Path<String>,
    Extension(principal): Extension<Principal>,
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Data<CardResponse>>, ApiError> {
    let card_id = parse_id(&card_id, "card")?;
    let card = store.remove_like(card_id, principal.user_id).await?;
    Ok(Json(Data::new(CardResponse::from(card))))
}
