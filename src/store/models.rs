use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "Jacques-Yves Cousteau";
pub const DEFAULT_ABOUT: &str = "Explorer";
pub const DEFAULT_AVATAR: &str =
    "https://pictures.s3.yandex.net/resources/jacques-cousteau_1604399756.png";

/// A user as returned by every read except the credential lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub about: String,
    pub avatar: String,
    pub email: String,
}

/// A user together with the stored password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub about: String,
    pub avatar: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial profile change; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub about: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub link: String,
    pub owner: ObjectId,
    #[serde(default)]
    pub likes: Vec<ObjectId>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime,
}

impl Card {
    #[must_use]
    pub fn is_owned_by(&self, user: ObjectId) -> bool {
        self.owner == user
    }

    #[must_use]
    pub fn is_liked_by(&self, user: ObjectId) -> bool {
        self.likes.contains(&user)
    }
}

#[derive(Debug, Clone)]
pub struct NewCard {
    pub name: String,
    pub link: String,
    pub owner: ObjectId,
}
