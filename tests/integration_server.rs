//! End-to-end tests for the users API.
//!
//! Each test serves a fresh application on an ephemeral local port and talks
//! to it over real HTTP with `reqwest`.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::{json, Value};
use tokio::{net::TcpListener, task::JoinHandle};
use users_api::{
    api::{self, AppState},
    auth::TokenIssuer,
};

struct TestServer {
    base_url: String,
    client: Client,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    async fn start() -> Result<Self> {
        let tokens = TokenIssuer::new(&SecretString::from("integration-secret".to_string()));
        let state = AppState::new(tokens);
        let origins = vec![api::parse_origin("http://localhost:3000")?];
        let app = api::app(&state, api::cors(&origins));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind test listener")?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app.into_make_service()).await {
                eprintln!("test server stopped: {err}");
            }
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
            handle,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn login(&self, email: &str, password: &str) -> Result<String> {
        let credentials = json!({"email": email, "password": password});

        let response = self
            .client
            .post(self.url("/register"))
            .json(&credentials)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = self
            .client
            .post(self.url("/login"))
            .json(&credentials)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = response.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response without token")
    }
}

#[tokio::test]
async fn register_login_and_manage_users() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.login("a@b.com", "x").await?;

    let response = server
        .client
        .post(server.url("/users"))
        .bearer_auth(&token)
        .json(&json!({"name": "Alice Johnson", "email": "alice@example.com", "age": 18, "role": "admin"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await?;
    assert_eq!(
        created,
        json!({"id": 1, "name": "Alice Johnson", "email": "alice@example.com", "age": 18, "role": "admin", "adult": true})
    );

    let fetched: Value = server
        .client
        .get(server.url("/users/1"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(fetched, created);

    let response = server
        .client
        .put(server.url("/users/1"))
        .bearer_auth(&token)
        .json(&json!({"age": 17}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await?;
    assert_eq!(updated["adult"], false);
    assert_eq!(updated["name"], "Alice Johnson");

    let response = server
        .client
        .delete(server.url("/users"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let next: Value = server
        .client
        .get(server.url("/next-id"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(next, json!({"next-id": 1}));

    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let body = json!({"email": "a@b.com", "password": "x"});

    let first = server.client.post(server.url("/register")).json(&body).send().await?;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = server.client.post(server.url("/register")).json(&body).send().await?;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let message: Value = second.json().await?;
    assert_eq!(message, json!({"message": "Email already exists"}));

    Ok(())
}

#[tokio::test]
async fn login_failures_do_not_reveal_which_field_was_wrong() -> Result<()> {
    let server = TestServer::start().await?;
    server.login("a@b.com", "x").await?;

    let wrong_password = server
        .client
        .post(server.url("/login"))
        .json(&json!({"email": "a@b.com", "password": "y"}))
        .send()
        .await?;
    let unknown_email = server
        .client
        .post(server.url("/login"))
        .json(&json!({"email": "nobody@b.com", "password": "x"}))
        .send()
        .await?;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let wrong_password: Value = wrong_password.json().await?;
    let unknown_email: Value = unknown_email.json().await?;
    assert_eq!(wrong_password, json!({"message": "Invalid email or password"}));
    assert_eq!(wrong_password, unknown_email);

    Ok(())
}

#[tokio::test]
async fn protected_routes_distinguish_missing_and_invalid_tokens() -> Result<()> {
    let server = TestServer::start().await?;

    let missing = server.client.delete(server.url("/users")).send().await?;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    let body: Value = missing.json().await?;
    assert_eq!(body, json!({"message": "No token provided"}));

    let forged = TokenIssuer::new(&SecretString::from("other-secret".to_string()))
        .issue(1, "a@b.com")?;
    let invalid = server
        .client
        .delete(server.url("/users"))
        .bearer_auth(forged)
        .send()
        .await?;
    assert_eq!(invalid.status(), StatusCode::FORBIDDEN);
    let body: Value = invalid.json().await?;
    assert_eq!(body, json!({"message": "Invalid token"}));

    Ok(())
}

#[tokio::test]
async fn serves_documentation() -> Result<()> {
    let server = TestServer::start().await?;

    let spec = server.client.get(server.url("/openapi.json")).send().await?;
    assert_eq!(spec.status(), StatusCode::OK);
    let spec: Value = spec.json().await?;
    assert_eq!(spec["info"]["title"], "users-api");

    let docs = server.client.get(server.url("/api-docs/")).send().await?;
    assert_eq!(docs.status(), StatusCode::OK);

    Ok(())
}
