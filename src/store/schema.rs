//! Document schema rules shared by every store backend.

use regex::Regex;

use super::{NewCard, NewUser, ProfileUpdate, StoreError, StoreResult};

const URL_PATTERN: &str = r"^https?://(www\.)?[a-zA-Z0-9\-._~:/?#\[\]@!$&'()*+,;=]+#?$";
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(EMAIL_PATTERN).is_ok_and(|regex| regex.is_match(email))
}

#[must_use]
pub fn valid_url(value: &str) -> bool {
    Regex::new(URL_PATTERN).is_ok_and(|regex| regex.is_match(value))
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> StoreResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(StoreError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

fn check_url(field: &str, value: &str) -> StoreResult<()> {
    if valid_url(value) {
        Ok(())
    } else {
        Err(StoreError::Validation(format!("{field} must be a valid URL")))
    }
}

/// Validate a user about to be inserted.
///
/// # Errors
/// Returns `StoreError::Validation` naming the first offending field.
pub fn validate_new_user(user: &NewUser) -> StoreResult<()> {
    check_length("name", &user.name, 2, 30)?;
    check_length("about", &user.about, 2, 200)?;
    check_url("avatar", &user.avatar)?;
    if !valid_email(&user.email) {
        return Err(StoreError::Validation("email must be a valid address".to_string()));
    }
    if user.password_hash.is_empty() {
        return Err(StoreError::Validation("password is required".to_string()));
    }
    Ok(())
}

/// # Errors
/// Returns `StoreError::Validation` when name or about is out of range.
pub fn validate_profile(update: &ProfileUpdate) -> StoreResult<()> {
    if let Some(name) = &update.name {
        check_length("name", name, 2, 30)?;
    }
    if let Some(about) = &update.about {
        check_length("about", about, 2, 200)?;
    }
    Ok(())
}

/// # Errors
/// Returns `StoreError::Validation` when the avatar is not a URL.
pub fn validate_avatar(avatar: &str) -> StoreResult<()> {
    check_url("avatar", avatar)
}

/// # Errors
/// Returns `StoreError::Validation` naming the first offending field.
pub fn validate_new_card(card: &NewCard) -> StoreResult<()> {
    check_length("name", &card.name, 2, 30)?;
    check_url("link", &card.link)
}
