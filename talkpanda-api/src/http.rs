//! Shared request plumbing for both backend clients

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::envelope::ApiEnvelope;
use crate::error::{ApiError, ApiResult};

/// One configured HTTP origin: base URL, timeout, optional bearer token.
pub(crate) struct Transport {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl Transport {
    pub(crate) fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
            auth_token: None,
        }
    }

    /// The single auth header-setter. An empty token clears the header.
    pub(crate) fn set_auth_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.auth_token = if token.is_empty() { None } else { Some(token) };
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.auth_token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder
    }

    /// POST a JSON body, expecting an enveloped JSON payload back.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path, "POST {}", self.base_url);
        unwrap_envelope(self.request(Method::POST, path).json(body)).await
    }

    /// POST a JSON body, expecting only an acknowledgement.
    pub(crate) async fn post_json_ack<B>(&self, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        debug!(path, "POST {}", self.base_url);
        unwrap_ack(self.request(Method::POST, path).json(body)).await
    }

    /// POST a raw text/plain body, expecting only an acknowledgement.
    pub(crate) async fn post_text_ack(&self, path: &str, body: String) -> ApiResult<()> {
        debug!(path, "POST {} (text/plain)", self.base_url);
        unwrap_ack(
            self.request(Method::POST, path)
                .header("Content-Type", "text/plain")
                .body(body),
        )
        .await
    }

    /// POST a raw binary body (audio upload).
    pub(crate) async fn post_bytes<T>(&self, path: &str, body: Vec<u8>) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        debug!(path, bytes = body.len(), "POST {} (octet-stream)", self.base_url);
        unwrap_envelope(
            self.request(Method::POST, path)
                .header("Content-Type", "application/octet-stream")
                .body(body),
        )
        .await
    }

    /// DELETE with a JSON body, expecting only an acknowledgement.
    pub(crate) async fn delete_json_ack<B>(&self, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        debug!(path, "DELETE {}", self.base_url);
        unwrap_ack(self.request(Method::DELETE, path).json(body)).await
    }

    /// GET with query parameters. Read-only, so a transport-level failure
    /// is retried exactly once; server rejections are not.
    pub(crate) async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        debug!(path, "GET {}", self.base_url);
        match self.get_once(path, query).await {
            Err(ApiError::NetworkUnavailable(err)) => {
                warn!(path, error = %err, "GET failed at transport level, retrying once");
                self.get_once(path, query).await
            }
            result => result,
        }
    }

    async fn get_once<T>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        unwrap_envelope(self.request(Method::GET, path).query(query)).await
    }
}

async fn send_checked(builder: RequestBuilder) -> ApiResult<(StatusCode, String)> {
    let response = builder.send().await?;
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(ApiError::ServerRejected {
            status: status.as_u16(),
            message,
        });
    }
    let body = response.text().await?;
    Ok((status, body))
}

async fn unwrap_envelope<T: DeserializeOwned>(builder: RequestBuilder) -> ApiResult<T> {
    let (status, body) = send_checked(builder).await?;
    let envelope: ApiEnvelope<T> = serde_json::from_str(&body)
        .map_err(|e| ApiError::InvalidResponse(format!("envelope decode failed: {}", e)))?;
    envelope.into_data(status.as_u16())
}

async fn unwrap_ack(builder: RequestBuilder) -> ApiResult<()> {
    let (status, body) = send_checked(builder).await?;
    let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_str(&body)
        .map_err(|e| ApiError::InvalidResponse(format!("envelope decode failed: {}", e)))?;
    envelope.into_ack(status.as_u16())
}
