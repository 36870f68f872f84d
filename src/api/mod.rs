use crate::{
    api::handlers::{
        auth::{self, require_session},
        cards, health, method_not_allowed, not_found, users,
    },
    store::SharedStore,
};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{delete, get, patch, post, put},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod error;
pub mod handlers;
mod openapi;

pub use handlers::auth::{AuthConfig, AuthState, SESSION_COOKIE_NAME};
pub use openapi::openapi;

const REQUEST_ID: &str = "x-request-id";

/// Build the application router.
///
/// Everything outside `/signup`, `/signin`, `/signout` and `/health` sits
/// behind the session guard. Unmatched paths fall through to a JSON `404`
/// without authentication, and unsupported methods answer a JSON `405`.
pub fn router(store: SharedStore, auth_state: Arc<AuthState>) -> Router {
    let protected = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/me", get(users::get_me).patch(users::update_profile))
        .route("/users/me/avatar", patch(users::update_avatar))
        .route("/users/:user_id", get(users::get_user))
        .route("/cards", get(cards::list_cards).post(cards::create_card))
        .route("/cards/:card_id", delete(cards::delete_card))
        .route(
            "/cards/:card_id/likes",
            put(cards::like_card).delete(cards::unlike_card),
        )
        .route_layer(middleware::from_fn(require_session));

    Router::new()
        .route("/signup", post(auth::signup::signup))
        .route("/signin", post(auth::signin::signin))
        .route("/signout", post(auth::session::signout))
        .route("/health", get(health::health).options(health::health))
        .merge(protected)
        .fallback(not_found)
        .layer(middleware::map_response(method_not_allowed))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(auth_state))
                .layer(Extension(store)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to bind the port or serve requests
pub async fn new(port: u16, store: SharedStore, auth_state: Arc<AuthState>) -> Result<()> {
    let app = router(store, auth_state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {err}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
