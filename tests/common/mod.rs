#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use ledger_api::auth::TokenKeys;
use ledger_api::config::AppConfig;
use ledger_api::database::Repositories;
use ledger_api::{router, AppState};

/// In-process server backed by a fresh in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub config: AppConfig,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;

        let state = AppState::new(config.clone(), Repositories::in_memory())?;
        let listener = tokio::net::TcpListener::bind(config.bind_address())
            .await
            .with_context(|| format!("failed to bind {}", config.bind_address()))?;

        tokio::spawn(async move {
            let _ = axum::serve(listener, router(state)).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            config,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Keys matching the server's, for minting tokens the server will check
    pub fn token_keys(&self) -> Result<TokenKeys> {
        Ok(TokenKeys::from_config(&self.config.security)?)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/api/register"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/api/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    /// Register then login, returning the bearer token
    pub async fn signup(&self, username: &str, password: &str) -> Result<String> {
        let res = self.register(username, password).await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let res = self.login(username, password).await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body: Value = res.json().await?;
        body["token"]
            .as_str()
            .map(String::from)
            .context("login response missing token")
    }

    pub async fn create_transaction(&self, token: &str, body: Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/api/transactions"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn list_transactions(&self, token: &str) -> Result<Vec<Value>> {
        let res = self
            .client
            .get(self.url("/api/transactions"))
            .bearer_auth(token)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "list failed: {}", res.status());
        Ok(res.json().await?)
    }
}
