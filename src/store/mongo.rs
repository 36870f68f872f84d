//! MongoDB backend.
//!
//! Flow Overview:
//! 1) Connect with the DSN and pick the database named in its path.
//! 2) Ensure the unique index on `users.email`.
//! 3) Serve reads with the password projected out; only the credential
//!    lookup selects it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions, ReturnDocument},
    Client, Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use std::future::IntoFuture;
use tracing::{debug, info_span, Instrument};

use super::{
    schema, Card, Entity, NewCard, NewUser, ProfileUpdate, Store, StoreError, StoreResult, User,
    UserCredentials,
};

pub const DEFAULT_DATABASE: &str = "mestodb";
const USERS: &str = "users";
const CARDS: &str = "cards";
const DUPLICATE_KEY: i32 = 11000;

/// Stored shape of a user, password included.
#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    about: String,
    avatar: String,
    email: String,
    password: String,
}

impl From<UserDocument> for UserCredentials {
    fn from(doc: UserDocument) -> Self {
        Self {
            user: User {
                id: doc.id,
                name: doc.name,
                about: doc.about,
                avatar: doc.avatar,
                email: doc.email,
            },
            password_hash: doc.password,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect to `dsn` and prepare the collections.
    /// # Errors
    /// Returns an error if the DSN is invalid, the server is unreachable or the
    /// email index cannot be created.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let mut options = ClientOptions::parse(dsn)
            .await
            .context("Invalid MongoDB connection string")?;
        options.app_name = Some(crate::APP_USER_AGENT.to_string());

        let database = options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client = Client::with_options(options).context("Failed to build MongoDB client")?;
        let store = Self {
            db: client.database(&database),
        };

        store
            .db
            .run_command(doc! { "ping": 1 })
            .await
            .context("Failed to connect to MongoDB")?;

        store.ensure_indexes().await?;

        debug!("Connected to MongoDB database {}", database);

        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.credentials()
            .create_index(index)
            .await
            .context("Failed to create unique index on users.email")?;
        Ok(())
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS)
    }

    fn credentials(&self) -> Collection<UserDocument> {
        self.db.collection(USERS)
    }

    fn cards(&self) -> Collection<Card> {
        self.db.collection(CARDS)
    }

    async fn update_user(&self, id: ObjectId, set: Document) -> StoreResult<User> {
        self.users()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .projection(hidden_password())
            .return_document(ReturnDocument::After)
            .into_future()
            .instrument(span("findAndModify", USERS))
            .await
            .map_err(classify)?
            .ok_or(StoreError::NotFound(Entity::User))
    }

    async fn update_card(&self, id: ObjectId, update: Document) -> StoreResult<Card> {
        self.cards()
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .into_future()
            .instrument(span("findAndModify", CARDS))
            .await
            .map_err(classify)?
            .ok_or(StoreError::NotFound(Entity::Card))
    }
}

fn hidden_password() -> Document {
    doc! { "password": 0 }
}

fn span(operation: &'static str, collection: &'static str) -> tracing::Span {
    info_span!(
        "db.query",
        db.system = "mongodb",
        db.operation = operation,
        db.collection = collection
    )
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY,
        ErrorKind::Command(command) => command.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn classify(err: mongodb::error::Error) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::Conflict("A user with this email already exists".to_string())
    } else {
        StoreError::Backend(anyhow::Error::new(err))
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> StoreResult<()> {
        self.db
            .run_command(doc! { "ping": 1 })
            .into_future()
            .instrument(span("ping", "admin"))
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.users()
            .find(doc! {})
            .projection(hidden_password())
            .sort(doc! { "_id": 1 })
            .into_future()
            .instrument(span("find", USERS))
            .await
            .map_err(classify)?
            .try_collect()
            .await
            .map_err(classify)
    }

    async fn find_user(&self, id: ObjectId) -> StoreResult<User> {
        self.users()
            .find_one(doc! { "_id": id })
            .projection(hidden_password())
            .into_future()
            .instrument(span("findOne", USERS))
            .await
            .map_err(classify)?
            .ok_or(StoreError::NotFound(Entity::User))
    }

    async fn find_credentials(&self, email: &str) -> StoreResult<UserCredentials> {
        self.credentials()
            .find_one(doc! { "email": email })
            .into_future()
            .instrument(span("findOne", USERS))
            .await
            .map_err(classify)?
            .map(UserCredentials::from)
            .ok_or(StoreError::NotFound(Entity::User))
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        schema::validate_new_user(&user)?;

        let document = UserDocument {
            id: ObjectId::new(),
            name: user.name,
            about: user.about,
            avatar: user.avatar,
            email: user.email,
            password: user.password_hash,
        };
        self.credentials()
            .insert_one(&document)
            .into_future()
            .instrument(span("insert", USERS))
            .await
            .map_err(classify)?;

        Ok(UserCredentials::from(document).user)
    }

    async fn update_profile(&self, id: ObjectId, update: ProfileUpdate) -> StoreResult<User> {
        schema::validate_profile(&update)?;

        let mut changes = Document::new();
        if let Some(name) = update.name {
            changes.insert("name", name);
        }
        if let Some(about) = update.about {
            changes.insert("about", about);
        }

        // `$set` rejects an empty document.
        if changes.is_empty() {
            return self.find_user(id).await;
        }
        self.update_user(id, changes).await
    }

    async fn update_avatar(&self, id: ObjectId, avatar: String) -> StoreResult<User> {
        schema::validate_avatar(&avatar)?;
        self.update_user(id, doc! { "avatar": avatar }).await
    }

    async fn list_cards(&self) -> StoreResult<Vec<Card>> {
        self.cards()
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .into_future()
            .instrument(span("find", CARDS))
            .await
            .map_err(classify)?
            .try_collect()
            .await
            .map_err(classify)
    }

    async fn find_card(&self, id: ObjectId) -> StoreResult<Card> {
        self.cards()
            .find_one(doc! { "_id": id })
            .into_future()
            .instrument(span("findOne", CARDS))
            .await
            .map_err(classify)?
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
        self.cards()
            .insert_one(&created)
            .into_future()
            .instrument(span("insert", CARDS))
            .await
            .map_err(classify)?;

        Ok(created)
    }

    async fn delete_card(&self, id: ObjectId) -> StoreResult<Card> {
        self.cards()
            .find_one_and_delete(doc! { "_id": id })
            .into_future()
            .instrument(span("findAndModify", CARDS))
            .await
            .map_err(classify)?
            .ok_or(StoreError::NotFound(Entity::Card))
    }

    async fn add_like(&self, id: ObjectId, user: ObjectId) -> StoreResult<Card> {
        self.update_card(id, doc! { "$addToSet": { "likes": user } })
            .await
    }

    async fn remove_like(&self, id: ObjectId, user: ObjectId) -> StoreResult<Card> {
        self.update_card(id, doc! { "$pull": { "likes": user } })
            .await
    }
}
