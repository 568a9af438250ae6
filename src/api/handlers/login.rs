use super::register::Credentials;
use crate::{
    api::error::{ApiError, Message, MSG_INVALID_CREDENTIALS},
    auth::{password, TokenIssuer},
    store::CredentialStore,
};
use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Token {
    token: String,
}

#[utoipa::path(
    post,
    path= "/login",
    request_body = Credentials,
    responses (
        (status = 200, description = "Login successful", body = Token, content_type = "application/json"),
        (status = 400, description = "Missing email or password", body = Message),
        (status = 401, description = "Invalid email or password", body = Message),
    ),
    tag= "auth"
)]
#[instrument(skip(credentials, tokens, payload))]
pub async fn login(
    credentials: Extension<Arc<CredentialStore>>,
    tokens: Extension<Arc<TokenIssuer>>,
    payload: Option<Json<Credentials>>,
) -> Result<Json<Token>, ApiError> {
    let (email, password) = payload
        .map_or_else(Credentials::default, |Json(payload)| payload)
        .into_parts()?;

    // Unknown email and wrong password share one response.
    let Some(credential) = credentials.find_by_email(&email).await else {
        debug!("Unknown email");
        return Err(ApiError::Unauthenticated(MSG_INVALID_CREDENTIALS));
    };

    if !password::verify_blocking(password, credential.password_hash).await? {
        debug!(id = credential.id, "Password mismatch");
        return Err(ApiError::Unauthenticated(MSG_INVALID_CREDENTIALS));
    }

    let token = tokens.issue(credential.id, &credential.email)?;
    debug!(id = credential.id, "Login successful");

    Ok(Json(Token { token }))
}
