use anyhow::{anyhow, Context, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use jsonwebtoken::{DecodingKey, EncodingKey};
use mongodb::bson::oid::ObjectId;
use secrecy::{ExposeSecret, SecretString};

use super::{
    password::CredentialHasher,
    token::{self, Claims},
};

const DEFAULT_SESSION_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_PASSWORD_MEMORY_KIB: u32 = 19 * 1024;
const DEFAULT_PASSWORD_ITERATIONS: u32 = 2;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    session_ttl_seconds: u64,
    session_cookie_secure: bool,
    password_memory_kib: u32,
    password_iterations: u32,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
            password_memory_kib: DEFAULT_PASSWORD_MEMORY_KIB,
            password_iterations: DEFAULT_PASSWORD_ITERATIONS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.session_ttl_seconds = ttl_seconds;
        self
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    /// Tune the argon2id cost (memory in KiB, number of passes).
    #[must_use]
    pub fn with_password_cost(mut self, memory_kib: u32, iterations: u32) -> Self {
        self.password_memory_kib = memory_kib;
        self.password_iterations = iterations;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }
}

/// Process-wide auth material, built once at start-up and shared read-only.
pub struct AuthState {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    hasher: CredentialHasher,
}

impl AuthState {
    /// Derive signing keys and the password hasher from `config`.
    /// # Errors
    /// Returns an error if the secret is empty or the argon2 cost is invalid.
    pub fn new(config: AuthConfig) -> Result<Self> {
        let secret = config.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(anyhow!("JWT secret must not be empty"));
        }
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let params = Params::new(
            config.password_memory_kib,
            config.password_iterations,
            1,
            None,
        )
        .map_err(|err| anyhow!("invalid argon2 parameters: {err}"))?;
        let hasher = CredentialHasher::new(Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            params,
        ));

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            hasher,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    /// Sign a session token for `user_id`.
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue_token(&self, user_id: ObjectId) -> Result<String> {
        let ttl = i64::try_from(self.config.session_ttl_seconds)
            .context("session ttl does not fit in i64")?;
        let claims = Claims::new(user_id, ttl);
        token::encode(&claims, &self.encoding_key)
    }

    /// Check signature and expiry of a session token.
    /// # Errors
    /// Returns an error for forged, malformed or expired tokens.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        token::decode(token, &self.decoding_key)
    }
}
