//! Route handlers and the helpers they share.

pub mod health;
pub mod hello;
pub mod login;
pub mod register;
pub mod users;

use crate::{
    api::error::ApiError,
    auth::{Claims, TokenIssuer},
};
use axum::http::HeaderMap;
use tracing::debug;

/// Gate a protected route on a valid bearer token.
///
/// A missing token maps to 401, a present but invalid one to 403.
pub(crate) fn require_auth(tokens: &TokenIssuer, headers: &HeaderMap) -> Result<Claims, ApiError> {
    tokens.authenticate(headers).map_err(|err| {
        debug!("Rejected bearer token: {err}");
        ApiError::from(err)
    })
}
