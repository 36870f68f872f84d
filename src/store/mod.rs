//! Document storage for users and cards.
//!
//! Backends implement [`Store`] and classify every failure as a
//! [`StoreError`]: missing documents, unique-key collisions and schema
//! violations are reported explicitly, anything else is a backend error.
//! Schema rules live in [`schema`] and are applied by every backend before a
//! write, so both backends reject the same documents.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::{fmt, sync::Arc};
use thiserror::Error;

pub mod memory;
pub mod models;
pub mod mongo;
pub mod schema;

pub use memory::MemoryStore;
pub use models::{Card, NewCard, NewUser, ProfileUpdate, User, UserCredentials};
pub use mongo::MongoStore;

/// Kind of document a store operation was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Card,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Card => f.write_str("card"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(Entity),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Check that the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn find_user(&self, id: ObjectId) -> StoreResult<User>;

    /// Look up a user by normalized email, including the password hash.
    async fn find_credentials(&self, email: &str) -> StoreResult<UserCredentials>;

    /// Insert a new user. Fails with `Conflict` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn update_profile(&self, id: ObjectId, update: ProfileUpdate) -> StoreResult<User>;

    async fn update_avatar(&self, id: ObjectId, avatar: String) -> StoreResult<User>;

    async fn list_cards(&self) -> StoreResult<Vec<Card>>;

    async fn find_card(&self, id: ObjectId) -> StoreResult<Card>;

    async fn insert_card(&self, card: NewCard) -> StoreResult<Card>;

    /// Remove a card and return the removed document.
    async fn delete_card(&self, id: ObjectId) -> StoreResult<Card>;

    /// Add `user` to the card likes; a no-op when already present.
    async fn add_like(&self, id: ObjectId, user: ObjectId) -> StoreResult<Card>;

    /// Remove `user` from the card likes; a no-op when absent.
    async fn remove_like(&self, id: ObjectId, user: ObjectId) -> StoreResult<Card>;
}

pub type SharedStore = Arc<dyn Store>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity() {
        assert_eq!(StoreError::NotFound(Entity::User).to_string(), "user not found");
        assert_eq!(StoreError::NotFound(Entity::Card).to_string(), "card not found");
    }

    #[test]
    fn backend_error_is_transparent() {
        let err = StoreError::from(anyhow::anyhow!("connection reset"));
        assert_eq!(err.to_string(), "connection reset");
    }
}
