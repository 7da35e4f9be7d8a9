use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message} ({status})")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },

    #[error("Not logged in. Use 'ledger auth login <username>' first")]
    NotLoggedIn,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Thin JSON client over the Ledger HTTP API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        self.send::<()>(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ClientError> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ClientError> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.send::<()>(Method::DELETE, path, None).await
    }

    /// Fail early when a protected call is made without a session
    pub fn require_token(&self) -> Result<(), ClientError> {
        match self.token {
            Some(_) => Ok(()),
            None => Err(ClientError::NotLoggedIn),
        }
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let json: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(json);
        }

        let message = json
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string();
        let code = json
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_string();

        Err(ClientError::Api {
            status,
            code,
            message,
        })
    }
}
