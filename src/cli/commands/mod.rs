pub mod auth;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_ALLOWED_ORIGINS: &str = "allowed-origins";
pub const ARG_VERBOSE: &str = "verbose";

/// Level names accepted by `USERS_API_LOG_LEVEL`, indexed by `-v` count.
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// `USERS_API_LOG_LEVEL` takes a level name or the equivalent `-v` count.
fn parse_log_level(value: &str) -> Result<u8, String> {
    let value = value.trim();
    LOG_LEVELS
        .iter()
        .position(|level| level.eq_ignore_ascii_case(value))
        .or_else(|| {
            value
                .parse::<usize>()
                .ok()
                .filter(|count| *count < LOG_LEVELS.len())
        })
        .and_then(|count| u8::try_from(count).ok())
        .ok_or_else(|| format!("expected 0-4 or one of: {}", LOG_LEVELS.join(", ")))
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("users-api")
        .about("In-memory users REST API with token authentication")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("USERS_API_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_ALLOWED_ORIGINS)
                .long(ARG_ALLOWED_ORIGINS)
                .help("Comma separated list of origins allowed by CORS")
                .default_value("http://localhost:3000")
                .env("USERS_API_ALLOWED_ORIGINS")
                .value_delimiter(','),
        )
        .arg(
            Arg::new(ARG_VERBOSE)
                .short('v')
                .long(ARG_VERBOSE)
                .help("Log more: -v warn, -vv info, -vvv debug, -vvvv trace")
                .env("USERS_API_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(parse_log_level),
        );

    auth::with_args(command)
}
