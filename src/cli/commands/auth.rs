use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_SECURE_COOKIE: &str = "secure-cookie";
pub const ARG_PASSWORD_MEMORY_KIB: &str = "password-memory-kib";
pub const ARG_PASSWORD_ITERATIONS: &str = "password-iterations";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret used to sign session tokens")
                .env("MESTO_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session token and cookie lifetime in seconds")
                .env("MESTO_SESSION_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SECURE_COOKIE)
                .long(ARG_SECURE_COOKIE)
                .help("Mark the session cookie Secure (HTTPS only)")
                .env("MESTO_SECURE_COOKIE")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_PASSWORD_MEMORY_KIB)
                .long(ARG_PASSWORD_MEMORY_KIB)
                .help("Argon2id memory cost in KiB")
                .env("MESTO_PASSWORD_MEMORY_KIB")
                .default_value("19456")
                .value_parser(clap::value_parser!(u32).range(8..)),
        )
        .arg(
            Arg::new(ARG_PASSWORD_ITERATIONS)
                .long(ARG_PASSWORD_ITERATIONS)
                .help("Argon2id iteration count")
                .env("MESTO_PASSWORD_ITERATIONS")
                .default_value("2")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub session_ttl_seconds: u64,
    pub secure_cookie: bool,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
}

impl Options {
    /// # Errors
    /// Returns an error if the signing secret is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --jwt-secret")?;

        Ok(Self {
            jwt_secret,
            session_ttl_seconds: matches
                .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(604_800),
            secure_cookie: matches.get_flag(ARG_SECURE_COOKIE),
            password_memory_kib: matches
                .get_one::<u32>(ARG_PASSWORD_MEMORY_KIB)
                .copied()
                .unwrap_or(19_456),
            password_iterations: matches
                .get_one::<u32>(ARG_PASSWORD_ITERATIONS)
                .copied()
                .unwrap_or(2),
        })
    }
}
