use crate::{
    api::{self, AuthConfig, AuthState},
    cli::telemetry,
    store::{MemoryStore, MongoStore, SharedStore},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub session_ttl_seconds: u64,
    pub secure_cookie: bool,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the store cannot be reached, the auth state is
/// invalid, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    info!(
        port = args.port,
        dsn = %redact_dsn(&args.dsn),
        session_ttl_seconds = args.session_ttl_seconds,
        secure_cookie = args.secure_cookie,
        "Startup configuration"
    );

    let store = open_store(&args.dsn).await?;

    let auth_config = AuthConfig::new(args.jwt_secret)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_cookie_secure(args.secure_cookie)
        .with_password_cost(args.password_memory_kib, args.password_iterations);
    let auth_state = Arc::new(AuthState::new(auth_config)?);

    let result = api::new(args.port, store, auth_state).await;

    telemetry::shutdown_tracer();

    result
}

async fn open_store(dsn: &str) -> Result<SharedStore> {
    let parsed = Url::parse(dsn).context("Invalid database connection string")?;

    if parsed.scheme() == "memory" {
        warn!("Using the in-memory store, data is lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = MongoStore::connect(dsn)
        .await
        .context("Failed to connect to database")?;
    Ok(Arc::new(store))
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}
