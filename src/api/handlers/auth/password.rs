//! Password hashing with argon2id.
//!
//! Hashing is CPU bound, so both operations run on the blocking pool.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    #[must_use]
    pub fn new(argon2: Argon2<'static>) -> Self {
        Self { argon2 }
    }

    /// Hash `password` with a fresh random salt into a PHC string.
    /// # Errors
    /// Returns an error if hashing fails or the worker panics.
    pub async fn hash(&self, password: String) -> Result<String> {
        let argon2 = self.argon2.clone();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| anyhow!("failed to hash password: {err}"))
        })
        .await
        .context("password hashing task failed")?
    }

    /// Compare `password` against a stored PHC string.
    /// # Errors
    /// Returns an error if the stored hash is malformed or the worker panics.
    pub async fn verify(&self, password: String, hash: String) -> Result<bool> {
        let argon2 = self.argon2.clone();
        tokio::task::spawn_blocking(move || {
            let parsed =
                PasswordHash::new(&hash).map_err(|err| anyhow!("invalid password hash: {err}"))?;
            Ok(argon2.verify_password(password.as_bytes(), &parsed).is_ok())
        })
        .await
        .context("password verification task failed")?
    }
}
