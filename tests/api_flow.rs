//! End-to-end request flows against the router backed by the in-memory store.
//!
//! Each test builds a fresh application, so users and cards never leak
//! between tests.

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use mesto::{
    api::{
        self,
        error::{INVALID_BODY_MESSAGE, METHOD_NOT_ALLOWED_MESSAGE},
        AuthConfig, AuthState,
    },
    store::MemoryStore,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const PASSWORD: &str = "correct horse battery staple";

fn app() -> Result<Router> {
    let config = AuthConfig::new(SecretString::from("integration-secret".to_string()))
        .with_password_cost(8, 1);
    let auth_state = Arc::new(AuthState::new(config)?);
    Ok(api::router(Arc::new(MemoryStore::new()), auth_state))
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> Result<Reply> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok(Reply {
        status,
        headers,
        body,
    })
}

async fn signup(app: &Router, email: &str) -> Result<String> {
    let reply = send(
        app,
        Method::POST,
        "/signup",
        Some(json!({ "email": email, "password": PASSWORD })),
        None,
    )
    .await?;
    assert_eq!(reply.status, StatusCode::OK);
    reply.body["data"]["_id"]
        .as_str()
        .map(str::to_string)
        .context("signup returned no id")
}

/// Sign in and return the `jwt=<token>` pair to send back as a Cookie header.
async fn signin(app: &Router, email: &str) -> Result<String> {
    let reply = send(
        app,
        Method::POST,
        "/signin",
        Some(json!({ "email": email, "password": PASSWORD })),
        None,
    )
    .await?;
    assert_eq!(reply.status, StatusCode::OK);
    let set_cookie = reply
        .headers
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .context("signin set no cookie")?;
    assert!(set_cookie.contains("HttpOnly"));
    set_cookie
        .split(';')
        .next()
        .map(str::to_string)
        .context("empty cookie")
}

async fn create_card(app: &Router, cookie: &str) -> Result<String> {
    let reply = send(
        app,
        Method::POST,
        "/cards",
        Some(json!({ "name": "Baikal", "link": "https://pictures.s3.yandex.net/baikal.jpg" })),
        Some(cookie),
    )
    .await?;
    assert_eq!(reply.status, StatusCode::OK);
    reply.body["data"]["_id"]
        .as_str()
        .map(str::to_string)
        .context("card has no id")
}

#[tokio::test]
async fn signup_applies_defaults_and_hides_password() -> Result<()> {
    let app = app()?;
    let reply = send(
        &app,
        Method::POST,
        "/signup",
        Some(json!({ "email": "Ann@Example.com", "password": PASSWORD })),
        None,
    )
    .await?;

    assert_eq!(reply.status, StatusCode::OK);
    let user = &reply.body["data"];
    assert_eq!(user["email"], "ann@example.com");
    assert_eq!(user["name"], "Jacques-Yves Cousteau");
    assert_eq!(user["about"], "Explorer");
    assert!(user.get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_signup_conflicts() -> Result<()> {
    let app = app()?;
    signup(&app, "ann@example.com").await?;

    let reply = send(
        &app,
        Method::POST,
        "/signup",
        Some(json!({ "email": "ann@example.com", "password": "another" })),
        None,
    )
    .await?;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert!(reply.body["message"].is_string());
    Ok(())
}

#[tokio::test]
async fn signup_rejects_invalid_fields() -> Result<()> {
    let app = app()?;
    for body in [
        json!({ "email": "not-an-email", "password": PASSWORD }),
        json!({ "email": "ann@example.com", "password": "" }),
        json!({ "email": "ann@example.com", "password": PASSWORD, "name": "A" }),
        json!({ "email": "ann@example.com", "password": PASSWORD, "avatar": "ftp://x" }),
    ] {
        let reply = send(&app, Method::POST, "/signup", Some(body), None).await?;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    }
    Ok(())
}

#[tokio::test]
async fn wrong_password_sets_no_cookie() -> Result<()> {
    let app = app()?;
    signup(&app, "ann@example.com").await?;

    for email in ["ann@example.com", "nobody@example.com"] {
        let reply = send(
            &app,
            Method::POST,
            "/signin",
            Some(json!({ "email": email, "password": "wrong" })),
            None,
        )
        .await?;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert!(reply.headers.get(header::SET_COOKIE).is_none());
        assert_eq!(reply.body["message"], "Incorrect email or password");
    }
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_session() -> Result<()> {
    let app = app()?;
    for (method, uri) in [
        (Method::GET, "/users"),
        (Method::GET, "/users/me"),
        (Method::GET, "/cards"),
        (Method::DELETE, "/cards/000000000000000000000000"),
    ] {
        let reply = send(&app, method, uri, None, None).await?;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.body["message"], "Authorization required");
    }

    let forged = send(
        &app,
        Method::GET,
        "/users/me",
        None,
        Some("jwt=not.a.token"),
    )
    .await?;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn session_reaches_profile_routes() -> Result<()> {
    let app = app()?;
    let user_id = signup(&app, "ann@example.com").await?;
    let cookie = signin(&app, "ann@example.com").await?;

    let me = send(&app, Method::GET, "/users/me", None, Some(&cookie)).await?;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["_id"], user_id.as_str());

    let by_id = send(
        &app,
        Method::GET,
        &format!("/users/{user_id}"),
        None,
        Some(&cookie),
    )
    .await?;
    assert_eq!(by_id.body["data"]["email"], "ann@example.com");

    let updated = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(json!({ "name": "Ann", "about": "Diver" })),
        Some(&cookie),
    )
    .await?;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["name"], "Ann");
    assert_eq!(updated.body["data"]["about"], "Diver");

    let avatar = send(
        &app,
        Method::PATCH,
        "/users/me/avatar",
        Some(json!({ "avatar": "not a url" })),
        Some(&cookie),
    )
    .await?;
    assert_eq!(avatar.status, StatusCode::BAD_REQUEST);

    let users = send(&app, Method::GET, "/users", None, Some(&cookie)).await?;
    assert_eq!(users.body["data"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn malformed_and_missing_ids() -> Result<()> {
    let app = app()?;
    signup(&app, "ann@example.com").await?;
    let cookie = signin(&app, "ann@example.com").await?;

    let malformed = send(&app, Method::GET, "/users/123", None, Some(&cookie)).await?;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);

    let missing_user = send(
        &app,
        Method::GET,
        "/users/000000000000000000000000",
        None,
        Some(&cookie),
    )
    .await?;
    assert_eq!(missing_user.status, StatusCode::NOT_FOUND);

    let missing_card = send(
        &app,
        Method::PUT,
        "/cards/000000000000000000000000/likes",
        None,
        Some(&cookie),
    )
    .await?;
    assert_eq!(missing_card.status, StatusCode::NOT_FOUND);
    assert_eq!(missing_card.body["message"], "Card not found");
    Ok(())
}

#[tokio::test]
async fn likes_behave_as_a_set() -> Result<()> {
    let app = app()?;
    let user_id = signup(&app, "ann@example.com").await?;
    let cookie = signin(&app, "ann@example.com").await?;
    let card_id = create_card(&app, &cookie).await?;
    let likes_uri = format!("/cards/{card_id}/likes");

    // Unliking a card nobody liked is a no-op.
    let unliked = send(&app, Method::DELETE, &likes_uri, None, Some(&cookie)).await?;
    assert_eq!(unliked.status, StatusCode::OK);
    assert_eq!(unliked.body["data"]["likes"], json!([]));

    for _ in 0..2 {
        let liked = send(&app, Method::PUT, &likes_uri, None, Some(&cookie)).await?;
        assert_eq!(liked.status, StatusCode::OK);
        assert_eq!(liked.body["data"]["likes"], json!([user_id]));
    }

    let unliked = send(&app, Method::DELETE, &likes_uri, None, Some(&cookie)).await?;
    assert_eq!(unliked.body["data"]["likes"], json!([]));
    Ok(())
}

#[tokio::test]
async fn only_owner_deletes_card() -> Result<()> {
    let app = app()?;
    signup(&app, "owner@example.com").await?;
    signup(&app, "other@example.com").await?;
    let owner = signin(&app, "owner@example.com").await?;
    let other = signin(&app, "other@example.com").await?;

    let card_id = create_card(&app, &owner).await?;
    let card_uri = format!("/cards/{card_id}");

    let forbidden = send(&app, Method::DELETE, &card_uri, None, Some(&other)).await?;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let cards = send(&app, Method::GET, "/cards", None, Some(&other)).await?;
    assert_eq!(cards.body["data"].as_array().map(Vec::len), Some(1));

    let deleted = send(&app, Method::DELETE, &card_uri, None, Some(&owner)).await?;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["data"]["_id"], card_id.as_str());

    let again = send(&app, Method::DELETE, &card_uri, None, Some(&owner)).await?;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn create_card_validates_link() -> Result<()> {
    let app = app()?;
    signup(&app, "ann@example.com").await?;
    let cookie = signin(&app, "ann@example.com").await?;

    let reply = send(
        &app,
        Method::POST,
        "/cards",
        Some(json!({ "name": "Baikal", "link": "baikal.jpg" })),
        Some(&cookie),
    )
    .await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unmatched_route_is_json_not_found() -> Result<()> {
    let app = app()?;
    let reply = send(&app, Method::GET, "/nowhere", None, None).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["message"], "Requested resource not found");
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_bad_request() -> Result<()> {
    let app = app()?;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\":"))?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["message"], INVALID_BODY_MESSAGE);
    Ok(())
}

#[tokio::test]
async fn unsupported_method_is_json() -> Result<()> {
    let app = app()?;
    signup(&app, "ann@example.com").await?;
    let cookie = signin(&app, "ann@example.com").await?;

    let public = send(&app, Method::GET, "/signup", None, None).await?;
    assert_eq!(public.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(public.body["message"], METHOD_NOT_ALLOWED_MESSAGE);
    assert!(public.headers.contains_key(header::ALLOW));

    let protected = send(&app, Method::PUT, "/users/me", None, Some(&cookie)).await?;
    assert_eq!(protected.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(protected.body["message"], METHOD_NOT_ALLOWED_MESSAGE);
    Ok(())
}

#[tokio::test]
async fn profile_patch_is_partial() -> Result<()> {
    let app = app()?;
    signup(&app, "ann@example.com").await?;
    let cookie = signin(&app, "ann@example.com").await?;

    let name_only = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(json!({ "name": "Ann" })),
        Some(&cookie),
    )
    .await?;
    assert_eq!(name_only.status, StatusCode::OK);
    assert_eq!(name_only.body["data"]["name"], "Ann");
    assert_eq!(name_only.body["data"]["about"], "Explorer");

    let about_only = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(json!({ "about": "Diver" })),
        Some(&cookie),
    )
    .await?;
    assert_eq!(about_only.body["data"]["name"], "Ann");
    assert_eq!(about_only.body["data"]["about"], "Diver");

    let too_short = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(json!({ "about": "D" })),
        Some(&cookie),
    )
    .await?;
    assert_eq!(too_short.status, StatusCode::BAD_REQUEST);

    let wrong_type = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(json!({ "name": 42 })),
        Some(&cookie),
    )
    .await?;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_type.body["message"], INVALID_BODY_MESSAGE);
    Ok(())
}

#[tokio::test]
async fn signout_clears_cookie_and_health_reports() -> Result<()> {
    let app = app()?;

    let signout = send(&app, Method::POST, "/signout", None, None).await?;
    assert_eq!(signout.status, StatusCode::OK);
    let cleared = signout
        .headers
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(cleared.starts_with("jwt="));
    assert!(cleared.contains("Max-Age=0"));

    let health = send(&app, Method::GET, "/health", None, None).await?;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["database"], "ok");
    assert!(health.headers.contains_key("x-request-id"));
    Ok(())
}
