//! Authenticated principal and the ownership check.
//!
//! The session guard inserts a [`Principal`] into the request extensions;
//! handlers behind the guard extract it with `Extension<Principal>`.

use mongodb::bson::oid::ObjectId;

use crate::{api::error::ApiError, store::Card};

/// Identity derived from a verified session token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: ObjectId,
}

impl Principal {
    /// Allow the mutation only when the principal owns `card`.
    ///
    /// # Errors
    /// Returns `403` on an owner mismatch.
    pub fn ensure_owns(&self, card: &Card) -> Result<(), ApiError> {
        if card.is_owned_by(self.user_id) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Cards can only be deleted by their owner".to_string(),
            ))
        }
    }
}
