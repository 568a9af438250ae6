use crate::auth::token::{DEFAULT_TTL, MAX_TTL};
use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;
use std::time::Duration;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_TOKEN_TTL: &str = "token-ttl";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Shared secret used to sign and verify bearer tokens (HS256)")
                .env("USERS_API_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL)
                .long(ARG_TOKEN_TTL)
                .help("Bearer token lifetime in seconds (at most 30 days)")
                .default_value("3600")
                .env("USERS_API_TOKEN_TTL_SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..=MAX_TTL.as_secs())),
        )
}

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub token_ttl: Duration,
}

impl Options {
    /// # Errors
    /// Returns an error if the secret is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .filter(|secret| !secret.is_empty())
            .context("missing required argument: --jwt-secret")?;

        let token_ttl = matches
            .get_one::<u64>(ARG_TOKEN_TTL)
            .copied()
            .map_or(DEFAULT_TTL, Duration::from_secs);

        Ok(Self {
            jwt_secret: SecretString::from(jwt_secret),
            token_ttl,
        })
    }
}
