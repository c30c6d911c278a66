//! Reqwest-backed production HTTP transport.

use async_trait::async_trait;
use courier_error::{CompletionError, CompletionErrorKind, CourierResult, HttpError};
use courier_interface::{HttpCall, HttpReply, HttpTransport};
use std::env;

/// Production transport over a pooled [`reqwest::Client`].
///
/// Carries the bearer token; the retry layer never sees credentials.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    api_key: String,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Create a transport authenticating with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create a transport reading the key from `OPENAI_API_KEY`.
    pub fn from_env() -> CourierResult<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| CompletionError::new(CompletionErrorKind::MissingApiKey))?;
        Ok(Self::new(api_key))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, call: &HttpCall) -> Result<HttpReply, HttpError> {
        let response = self
            .client
            .post(&call.url)
            .bearer_auth(&self.api_key)
            .json(&call.body)
            .send()
            .await
            .map_err(|e| HttpError::new(format!("request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::new(format!("failed to read response body: {}", e)))?;

        Ok(HttpReply { status, body })
    }
}
