use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names indexed by the verbosity count they stand for.
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept `MESTO_LOG_LEVEL` as a level name or as the equivalent `-v` count.
///
/// # Errors
///
/// Returns a message listing the accepted values.
pub fn parse_log_level(raw: &str) -> Result<u8, String> {
    let value = raw.trim().to_ascii_lowercase();

    let index = match value.parse::<usize>() {
        Ok(count) => Some(count).filter(|count| *count < LEVELS.len()),
        Err(_) => LEVELS.iter().position(|level| *level == value),
    };

    index
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| {
            format!(
                "expected 0-{} or one of {}",
                LEVELS.len() - 1,
                LEVELS.join(", ")
            )
        })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Raise log verbosity, repeat up to -vvvv (errors only by default)")
            .long_help(
                "Raise log verbosity: -v warn, -vv info, -vvv debug, -vvvv trace.\n\
                 MESTO_LOG_LEVEL takes a level name or the same count as a number.",
            )
            .env("MESTO_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::new(parse_log_level)),
    )
}
