use super::{
    error::ErrorBody,
    handlers::{
        auth::{session, signin, signup},
        cards, health, users, CardResponse, UserResponse,
    },
};
use utoipa::{
    openapi::{Contact, License, Tag},
    OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        signup::signup,
        signin::signin,
        session::signout,
        users::list_users,
        users::get_me,
        users::get_user,
        users::update_profile,
        users::update_avatar,
        cards::list_cards,
        cards::create_card,
        cards::delete_card,
        cards::like_card,
        cards::unlike_card,
    ),
    components(schemas(
        ErrorBody,
        UserResponse,
        CardResponse,
        health::Health,
        signup::SignupRequest,
        signin::SigninRequest,
        session::SignoutResponse,
        users::ProfileRequest,
        users::AvatarRequest,
        cards::CardRequest,
    ))
)]
struct ApiDoc;

/// Build the `OpenAPI` document served by the router.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    // Cargo.toml metadata instead of the derive defaults.
    doc.info.title = env!("CARGO_PKG_NAME").to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.info.description = optional_str(env!("CARGO_PKG_DESCRIPTION")).map(str::to_string);
    doc.info.contact = cargo_contact();
    doc.info.license = cargo_license();

    doc.tags = Some(vec![
        tag("auth", "Signup, signin and signout"),
        tag("users", "User profiles"),
        tag("cards", "Photo cards and likes"),
        tag("health", "Service and database status"),
    ]);

    doc
}

fn tag(name: &str, description: &str) -> Tag {
    let mut tag = Tag::new(name);
    tag.description = Some(description.to_string());
    tag
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let primary = env!("CARGO_PKG_AUTHORS").split(';').next().map(str::trim)?;

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    Some(value.trim()).filter(|trimmed| !trimmed.is_empty())
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    fn non_empty(value: &str) -> Option<&str> {
        Some(value.trim()).filter(|v| !v.is_empty())
    }

    match author.split_once('<') {
        Some((name, rest)) => (non_empty(name), non_empty(rest.trim_end_matches('>'))),
        None => (non_empty(author), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let doc = openapi();
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(doc.info.version, env!("CARGO_PKG_VERSION"));

        let contact = doc.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Team Mesto"));
            assert_eq!(contact.email.as_deref(), Some("team@mesto.dev"));
        }

        let license = doc.info.license;
        assert!(license.is_some_and(|license| license.name == "BSD-3-Clause"));
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = openapi();
        for path in [
            "/health",
            "/signup",
            "/signin",
            "/signout",
            "/users",
            "/users/me",
            "/users/me/avatar",
            "/users/{userId}",
            "/cards",
            "/cards/{cardId}",
            "/cards/{cardId}/likes",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn parse_author_variants() {
        assert_eq!(
            parse_author("Team Mesto <team@mesto.dev>"),
            (Some("Team Mesto"), Some("team@mesto.dev"))
        );
        assert_eq!(parse_author("Solo"), (Some("Solo"), None));
        assert_eq!(parse_author(""), (None, None));
    }
}
