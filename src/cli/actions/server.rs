use crate::{
    api::{self, AppState},
    auth::TokenIssuer,
};
use anyhow::Result;
use secrecy::SecretString;
use std::time::Duration;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub jwt_secret: SecretString,
    pub token_ttl: Duration,
}

/// Execute the server action.
/// # Errors
/// Returns an error if an allowed origin is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let tokens = TokenIssuer::new(&args.jwt_secret).with_ttl(args.token_ttl);

    debug!(
        port = args.port,
        origins = ?args.allowed_origins,
        token_ttl = ?tokens.ttl(),
        "Starting server"
    );
    let state = AppState::new(tokens);

    api::new(args.port, state, &args.allowed_origins).await
}
