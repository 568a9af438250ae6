//! Stateless HS256 bearer tokens.
//!
//! Nothing is stored server side: a token is valid while its signature checks
//! out and the current time is before `exp`.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default token lifetime: one hour.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Longest lifetime accepted from configuration: thirty days.
pub const MAX_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: u64,
    pub email: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// No `Authorization` header, or not a `Bearer` credential.
    #[error("no token provided")]
    Missing,
    /// Bad signature, malformed token or expired.
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let secret = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: DEFAULT_TTL,
        }
    }

    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `{id, email}` valid for the configured ttl from now.
    ///
    /// # Errors
    /// Returns [`TokenError::Signing`] if the claims cannot be encoded.
    pub fn issue(&self, id: u64, email: &str) -> Result<String, TokenError> {
        self.issue_at(id, email, get_current_timestamp())
    }

    /// Issue a token as if it had been created at `issued_at` (unix seconds).
    ///
    /// # Errors
    /// Returns [`TokenError::Signing`] if the claims cannot be encoded.
    pub fn issue_at(&self, id: u64, email: &str, issued_at: u64) -> Result<String, TokenError> {
        let claims = Claims {
            id,
            email: email.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl.as_secs()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }

    /// Check signature and expiry and return the embedded claims.
    ///
    /// # Errors
    /// Returns [`TokenError::Invalid`] for a bad signature, malformed token or
    /// when the current time is not before `exp`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| TokenError::Invalid(err.to_string()))?;

        // jsonwebtoken accepts `exp == now`; the token must be strictly unexpired.
        if get_current_timestamp() >= data.claims.exp {
            debug!(id = data.claims.id, "token expired");
            return Err(TokenError::Invalid("token expired".to_string()));
        }

        Ok(data.claims)
    }

    /// Extract the bearer token from `headers` and verify it.
    ///
    /// # Errors
    /// Returns [`TokenError::Missing`] when no bearer token is present, or
    /// [`TokenError::Invalid`] when it fails verification.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, TokenError> {
        let token = bearer_token(headers).ok_or(TokenError::Missing)?;
        self.verify(token)
    }
}

/// Return the credential of an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
