//! Test helpers for integration tests
//!
//! Spawns an in-process server on an ephemeral port and wraps reqwest for
//! the JSON calls the tests make. Every server gets its own bootstrap admin.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use migtrack_api::{create_app, create_app_state};
use migtrack_common::{
    AppConfig, AppSettings, AuthConfig, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    McpConfig, RateLimitConfig, ServerConfig,
};
use migtrack_core::UserRole;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{AuthResponse, RegisterRequest, UserResponse};

/// A signed-in user
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub token: String,
}

impl From<AuthResponse> for Session {
    fn from(auth: AuthResponse) -> Self {
        Self {
            user_id: auth.user.id,
            token: auth.access_token,
        }
    }
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub admin: Session,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server and register its admin
    pub async fn start() -> Result<Self> {
        let admin_request = RegisterRequest::unique();
        let config = test_config(vec![admin_request.email.clone()])?;

        let state = create_app_state(config).await?;
        let app = create_app(state)?;

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        let mut server = Self {
            addr,
            client,
            admin: Session {
                user_id: 0,
                token: String::new(),
            },
            _handle: handle,
        };

        let auth = server.register(&admin_request).await?;
        anyhow::ensure!(auth.user.role == "admin", "bootstrap admin got role {}", auth.user.role);
        server.admin = Session::from(auth);

        Ok(server)
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn api_url(&self, path: &str) -> String {
        if path.starts_with("/health") {
            format!("{}{}", self.base_url(), path)
        } else {
            format!("{}/api/v1{}", self.base_url(), path)
        }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.api_url(path)).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .get(self.api_url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.api_url(path)).json(body).send().await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize + ?Sized>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.api_url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PATCH request with auth token
    pub async fn patch_auth<T: Serialize + ?Sized>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .patch(self.api_url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a DELETE request with auth token
    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.api_url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Register and expect 201
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let response = self.post("/auth/register", request).await?;
        assert_json(response, StatusCode::CREATED).await
    }

    /// Register a fresh user and have the admin give it `role`
    pub async fn user_with_role(&self, role: UserRole) -> Result<Session> {
        let session = Session::from(self.register(&RegisterRequest::unique()).await?);

        if role != UserRole::Viewer {
            let response = self
                .patch_auth(
                    &format!("/users/{}", session.user_id),
                    &self.admin.token,
                    &json!({ "role": role }),
                )
                .await?;
            let user: UserResponse = assert_json(response, StatusCode::OK).await?;
            anyhow::ensure!(user.role == role.as_str(), "role not applied");
        }

        Ok(session)
    }
}

/// Configuration for an in-process server against `DATABASE_URL`
pub fn test_config(bootstrap_admin_emails: Vec<String>) -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set for integration tests"))?;
    let secret = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| "integration-test-secret-that-is-long-enough".to_string());

    Ok(AppConfig {
        app: AppSettings {
            name: "migtrack-test".to_string(),
            env: Environment::Development,
        },
        api: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url,
            max_connections: 5,
            min_connections: 1,
            run_migrations: true,
        },
        jwt: JwtConfig {
            secret,
            access_token_expiry: 900,
            refresh_token_expiry: 3600,
        },
        auth: AuthConfig {
            bootstrap_admin_emails,
        },
        rate_limit: RateLimitConfig {
            requests_per_second: 1000,
            burst: 1000,
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
        mcp: McpConfig::default(),
    })
}

/// Whether the database for integration tests is configured
pub async fn check_test_env() -> bool {
    dotenvy::dotenv().ok();

    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert an error status and return the `error.code` of the body
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: crate::fixtures::ErrorBody = assert_json(response, expected_status).await?;
    Ok(body.error.code)
}
