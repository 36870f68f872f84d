//! Session token encoding (HS256 JWT).

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id as 24 hex characters.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn new(user_id: ObjectId, ttl_seconds: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_hex(),
            iat: now,
            exp: now.saturating_add(ttl_seconds),
        }
    }
}

pub(super) fn encode(claims: &Claims, key: &EncodingKey) -> Result<String> {
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, key)
        .context("failed to sign session token")
}

pub(super) fn decode(token: &str, key: &DecodingKey) -> Result<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    let data = jsonwebtoken::decode::<Claims>(token, key, &validation)
        .context("invalid session token")?;
    Ok(data.claims)
}
