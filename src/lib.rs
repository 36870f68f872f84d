//! # Mesto (users, sessions and photo cards)
//!
//! `mesto` is a small REST backend. Users sign up with an email and password,
//! sign in to receive a session cookie, edit their profile and avatar, and
//! publish photo cards that other users can like.
//!
//! ## Authentication
//!
//! Passwords are hashed with `argon2id` and never leave the store layer in
//! plain form. A successful sign-in issues an `HS256` JWT carried in the
//! `HttpOnly` cookie `jwt`. Every route except `/signup`, `/signin`,
//! `/signout` and `/health` runs behind the session guard, which rejects
//! missing, forged or expired tokens with `401` before touching the store.
//!
//! ## Storage
//!
//! Documents live in MongoDB (`users` and `cards` collections). Store
//! backends report outcomes through [`store::StoreError`] so handlers map
//! not-found, duplicate-key and validation failures without knowing which
//! backend produced them. A `memory://` DSN selects an in-process store.
//!
//! ## Ownership
//!
//! A card can only be deleted by its owner; anyone signed in may like or
//! unlike it. Likes behave as a set.

pub mod api;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
