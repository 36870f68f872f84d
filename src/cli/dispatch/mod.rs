//! Map parsed CLI arguments to the action the binary runs.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(3000);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        jwt_secret: auth_opts.jwt_secret,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        secure_cookie: auth_opts.secure_cookie,
        password_memory_kib: auth_opts.password_memory_kib,
        password_iterations: auth_opts.password_iterations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn builds_server_action() {
        temp_env::with_vars(
            [
                ("MESTO_PORT", None::<&str>),
                ("MESTO_DSN", None),
                ("MESTO_SECURE_COOKIE", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "mesto",
                    "--jwt-secret",
                    "s3cret",
                    "--dsn",
                    "memory://",
                ]);

                let action = handler(&matches);
                assert!(action.is_ok());
                if let Ok(Action::Server(args)) = action {
                    assert_eq!(args.port, 3000);
                    assert_eq!(args.dsn, "memory://");
                    assert_eq!(args.jwt_secret.expose_secret(), "s3cret");
                    assert!(!args.secure_cookie);
                }
            },
        );
    }
}
