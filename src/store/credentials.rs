//! Registered identities used by `/register` and `/login`.
//!
//! The credential sequence is independent of the user profile sequence.

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: u64,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("email already exists: {0}")]
pub struct DuplicateEmail(pub String);

#[derive(Debug, Default)]
pub struct CredentialStore {
    credentials: RwLock<Vec<Credential>>,
}

impl CredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, email: &str) -> bool {
        self.credentials
            .read()
            .await
            .iter()
            .any(|credential| credential.email == email)
    }

    pub async fn find_by_email(&self, email: &str) -> Option<Credential> {
        self.credentials
            .read()
            .await
            .iter()
            .find(|credential| credential.email == email)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.credentials.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.credentials.read().await.is_empty()
    }

    /// Store a new credential; the uniqueness check and the insert share one write guard.
    ///
    /// # Errors
    /// Returns [`DuplicateEmail`] if `email` is already registered.
    pub async fn insert(
        &self,
        email: String,
        password_hash: String,
    ) -> Result<Credential, DuplicateEmail> {
        let mut credentials = self.credentials.write().await;

        if credentials.iter().any(|credential| credential.email == email) {
            return Err(DuplicateEmail(email));
        }

        let credential = Credential {
            id: credentials.last().map_or(1, |last| last.id + 1),
            email,
            password_hash,
        };

        debug!(id = credential.id, "credential stored");
        credentials.push(credential.clone());

        Ok(credential)
    }
}
