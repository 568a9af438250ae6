use crate::{
    api::error::{ApiError, Message, MSG_CREDENTIALS_REQUIRED, MSG_EMAIL_EXISTS},
    auth::password,
    store::CredentialStore,
};
use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

/// Body of `/register` and `/login`; missing fields are reported as a 400.
#[derive(ToSchema, Serialize, Deserialize, Default)]
pub struct Credentials {
    #[schema(example = "a@b.com")]
    pub email: Option<String>,
    #[schema(example = "x")]
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Return `(email, password)` when both are present and non-empty.
    pub(crate) fn into_parts(self) -> Result<(String, String), ApiError> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(ApiError::BadRequest(MSG_CREDENTIALS_REQUIRED)),
        }
    }
}

#[utoipa::path(
    post,
    path= "/register",
    request_body = Credentials,
    responses (
        (status = 201, description = "Registration successful", body = Message, content_type = "application/json"),
        (status = 400, description = "Missing fields or email already exists", body = Message),
    ),
    tag= "auth"
)]
#[instrument(skip(credentials, payload))]
pub async fn register(
    credentials: Extension<Arc<CredentialStore>>,
    payload: Option<Json<Credentials>>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let (email, password) = payload
        .map_or_else(Credentials::default, |Json(payload)| payload)
        .into_parts()?;

    // Skip the hashing cost for an obvious duplicate; insert checks again under the lock.
    if credentials.contains(&email).await {
        debug!("Email already registered");
        return Err(ApiError::Conflict(MSG_EMAIL_EXISTS));
    }

    let password_hash = password::hash_blocking(password).await?;

    credentials
        .insert(email, password_hash)
        .await
        .map_err(|_| ApiError::Conflict(MSG_EMAIL_EXISTS))?;

    Ok((
        StatusCode::CREATED,
        Json(Message::new("User registered successfully")),
    ))
}
