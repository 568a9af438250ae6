//! bcrypt password hashing.
//!
//! Both functions are CPU bound; async callers should run them through
//! [`hash_blocking`] / [`verify_blocking`] so the runtime workers stay free.

use thiserror::Error;

/// bcrypt work factor.
pub const COST: u32 = 10;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hash `password` with a fresh random salt.
///
/// # Errors
/// Returns an error if bcrypt rejects the input.
pub fn hash(password: &str) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, COST)?)
}

/// Check `password` against a stored bcrypt hash. A malformed hash never matches.
#[must_use]
pub fn verify(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

/// [`hash`] on the blocking thread pool.
///
/// # Errors
/// Returns an error if hashing fails or the blocking task panics.
pub async fn hash_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash(&password)).await?
}

/// [`verify`] on the blocking thread pool.
///
/// # Errors
/// Returns an error if the blocking task panics.
pub async fn verify_blocking(password: String, password_hash: String) -> Result<bool, PasswordError> {
    Ok(tokio::task::spawn_blocking(move || verify(&password, &password_hash)).await?)
}
