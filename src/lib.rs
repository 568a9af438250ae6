//! # users-api
//!
//! A small REST API over an in-memory collection of user profiles, with
//! registration/login and stateless bearer tokens gating the mutating routes.
//!
//! ## Stores
//!
//! - **Profiles:** ids are `last.id + 1` (or `1` when empty), so deleting the last
//!   profile and creating another reuses its id. `adult` is rederived from `age`
//!   on every write.
//! - **Credentials:** email + bcrypt hash, email unique, separate id sequence.
//!
//! ## Authentication
//!
//! `POST /login` returns an HS256 JWT valid for one hour. Protected routes answer
//! `401` when no bearer token is sent and `403` when the token does not verify.
//!
//! ## Documentation
//!
//! Every route is described with `utoipa`; Swagger UI is served at `/api-docs`.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
