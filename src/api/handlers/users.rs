//! User profile CRUD endpoints.
//!
//! Flow Overview:
//! 1) Mutating routes require a bearer token (401 when absent, 403 when invalid).
//! 2) Create/update bodies run through the validation pipeline; any violation
//!    returns 400 with every error and leaves the store untouched.
//! 3) The store assigns ids and rederives `adult` on every write.

use super::require_auth;
use crate::{
    api::{
        error::{ApiError, Message, ValidationErrors},
        validation::{validate_new_user, validate_user_changes},
    },
    auth::TokenIssuer,
    store::{Role, User, UserStore},
};
use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

/// Documented shape of a create body; the handler validates raw JSON.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserCreateRequest {
    #[schema(example = "Alice Johnson")]
    pub name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = 18, minimum = 0, maximum = 125)]
    pub age: u8,
    pub role: Role,
}

/// Documented shape of an update body; every field is optional.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[schema(minimum = 0, maximum = 125)]
    pub age: Option<u8>,
    pub role: Option<Role>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct NextId {
    #[serde(rename = "next-id")]
    #[schema(example = 1)]
    pub next_id: u64,
}

/// Non-numeric ids can never match a stored profile.
fn parse_id(id: &str) -> Result<u64, ApiError> {
    id.trim().parse::<u64>().map_err(|_| ApiError::NotFound)
}

/// A request without a JSON body validates like `{}`.
fn body_or_empty(payload: Option<Json<Value>>) -> Value {
    payload.map_or_else(|| Value::Object(Map::new()), |Json(body)| body)
}

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All user profiles in insertion order", body = [User]),
    ),
    tag = "users"
)]
pub async fn list_users(users: Extension<Arc<UserStore>>) -> impl IntoResponse {
    Json(users.list().await)
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ("id" = u64, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User profile", body = User),
        (status = 404, description = "User not found", body = Message),
    ),
    tag = "users"
)]
pub async fn get_user(
    Path(id): Path<String>,
    users: Extension<Arc<UserStore>>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id)?;
    users.get(id).await.map(Json).ok_or(ApiError::NotFound)
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = UserCreateRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation failed", body = ValidationErrors),
        (status = 401, description = "No token provided", body = Message),
        (status = 403, description = "Invalid token", body = Message),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(users, tokens, headers, payload))]
pub async fn create_user(
    users: Extension<Arc<UserStore>>,
    tokens: Extension<Arc<TokenIssuer>>,
    headers: HeaderMap,
    payload: Option<Json<Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_auth(&tokens, &headers)?;

    let new_user = validate_new_user(&body_or_empty(payload))
        .into_result()
        .map_err(ApiError::ValidationFailed)?;

    let user = users.create(new_user).await;
    debug!(id = user.id, by = claims.id, "Created user");

    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    params(
        ("id" = u64, Path, description = "User id")
    ),
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Validation failed", body = ValidationErrors),
        (status = 401, description = "No token provided", body = Message),
        (status = 403, description = "Invalid token", body = Message),
        (status = 404, description = "User not found", body = Message),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(users, tokens, headers, payload))]
pub async fn update_user(
    Path(id): Path<String>,
    users: Extension<Arc<UserStore>>,
    tokens: Extension<Arc<TokenIssuer>>,
    headers: HeaderMap,
    payload: Option<Json<Value>>,
) -> Result<Json<User>, ApiError> {
    require_auth(&tokens, &headers)?;

    let changes = validate_user_changes(&body_or_empty(payload))
        .into_result()
        .map_err(ApiError::ValidationFailed)?;

    let id = parse_id(&id)?;
    users
        .update(id, changes)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = u64, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "No token provided", body = Message),
        (status = 403, description = "Invalid token", body = Message),
        (status = 404, description = "User not found", body = Message),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(users, tokens, headers))]
pub async fn delete_user(
    Path(id): Path<String>,
    users: Extension<Arc<UserStore>>,
    tokens: Extension<Arc<TokenIssuer>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    require_auth(&tokens, &headers)?;

    let id = parse_id(&id)?;
    if users.delete(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

#[utoipa::path(
    delete,
    path = "/users",
    responses(
        (status = 204, description = "All users deleted"),
        (status = 401, description = "No token provided", body = Message),
        (status = 403, description = "Invalid token", body = Message),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(users, tokens, headers))]
pub async fn delete_all_users(
    users: Extension<Arc<UserStore>>,
    tokens: Extension<Arc<TokenIssuer>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    require_auth(&tokens, &headers)?;

    users.clear().await;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/next-id",
    responses(
        (status = 200, description = "Id the next created user will receive", body = NextId),
    ),
    tag = "users"
)]
pub async fn next_id(users: Extension<Arc<UserStore>>) -> Json<NextId> {
    Json(NextId {
        next_id: users.next_id().await,
    })
}
