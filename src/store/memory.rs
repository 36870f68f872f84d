//! In-process store used for `memory://` DSNs and tests.

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    schema, Card, Entity, NewCard, NewUser, ProfileUpdate, Store, StoreError, StoreResult, User,
    UserCredentials,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<ObjectId, UserCredentials>>,
    cards: RwLock<Vec<Card>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn update_user<F>(&self, id: ObjectId, apply: F) -> StoreResult<User>
    where
        F: FnOnce(&mut User) + Send,
    {
        let mut users = self.users.write().await;
        let record = users.get_mut(&id).ok_or(StoreError::NotFound(Entity::User))?;
        apply(&mut record.user);
        Ok(record.user.clone())
    }

    async fn update_card<F>(&self, id: ObjectId, apply: F) -> StoreResult<Card>
    where
        F: FnOnce(&mut Card) + Send,
    {
        let mut cards = self.cards.write().await;
        let card = cards
            .iter_mut()
            .find(|card| card.id == id)
            .ok_or(StoreError::NotFound(Entity::Card))?;
        apply(card);
        Ok(card.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let mut list: Vec<User> = users.values().map(|record| record.user.clone()).collect();
        // ObjectIds grow with creation time, keep listings in insertion order.
        list.sort_by_key(|user| user.id);
        Ok(list)
    }

    async fn find_user(&self, id: ObjectId) -> StoreResult<User> {
        self.users
            .read()
            .await
            .get(&id)
            .map(|record| record.user.clone())
            .ok_or(StoreError::NotFound(Entity::User))
    }

    async fn find_credentials(&self, email: &str) -> StoreResult<UserCredentials> {
        self.users
            .read()
            .await
            .values()
            .find(|record| record.user.email == email)
            .cloned()
            .ok_or(StoreError::NotFound(Entity::User))
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        schema::validate_new_user(&user)?;

        let mut users = self.users.write().await;
        if users.values().any(|record| record.user.email == user.email) {
            return Err(StoreError::Conflict(
                "A user with this email already exists".to_string(),
            ));
        }

        let record = UserCredentials {
            user: User {
                id: ObjectId::new(),
                name: user.name,
                about: user.about,
                avatar: user.avatar,
                email: user.email,
            },
            password_hash: user.password_hash,
        };
        let created = record.user.clone();
        users.insert(created.id, record);
        Ok(created)
    }

    async fn update_profile(&self, id: ObjectId, update: ProfileUpdate) -> StoreResult<User> {
        schema::validate_profile(&update)?;
        self.update_user(id, |user| {
            if let Some(name) = update.name {
                user.name = name;
            }
            if let Some(about) = update.about {
                user.about = about;
            }
        })
        .await
    }

    async fn update_avatar(&self, id: ObjectId, avatar: String) -> StoreResult<User> {
        schema::validate_avatar(&avatar)?;
        self.update_user(id, |user| user.avatar = avatar).await
    }

    async fn list_cards(&self) -> StoreResult<Vec<Card>> {
        Ok(self.cards.read().await.clone())
    }

    async fn find_card(&self, id: ObjectId) -> StoreResult<Card> {
        self.cards
            .read()
            .await
            .iter()
            .find(|card| card.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(Entity::Card))
    }

    async fn insert_card(&self, card: NewCard) -> StoreResult<Card> {
        schema::validate_new_card(&card)?;

        let created = Card {
            id: ObjectId::new(),
            name: card.name,
            link: card.link,
            owner: card.owner,
            likes: Vec::new(),
            created_at: DateTime::now(),
        };
        self.cards.write().await.push(created.clone());
        Ok(created)
    }

    async fn delete_card(&self, id: ObjectId) -> StoreResult<Card> {
        let mut cards = self.cards.write().await;
        let index = cards
            .iter()
            .position(|card| card.id == id)
            .ok_or(StoreError::NotFound(Entity::Card))?;
        Ok(cards.remove(index))
    }

    async fn add_like(&self, id: ObjectId, user: ObjectId) -> StoreResult<Card> {
        self.update_card(id, |card| {
            if !card.is_liked_by(user) {
                card.likes.push(user);
            }
        })
        .await
    }

    async fn remove_like(&self, id: ObjectId, user: ObjectId) -> StoreResult<Card> {
        self.update_card(id, |card| card.likes.retain(|like| *like != user))
            .await
    }
}
