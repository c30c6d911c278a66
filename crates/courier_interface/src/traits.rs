//! Trait definitions for completion backends and their collaborators.

use crate::{HttpCall, HttpReply};
use async_trait::async_trait;
use courier_core::{CompletionReply, CompletionRequest};
use courier_error::{CourierResult, HttpError};

/// Core trait for anything that can answer a completion request.
///
/// Implementations are expected to handle their own admission control and
/// retries; callers see a single logical call per request.
#[async_trait]
pub trait CompletionDriver: Send + Sync {
    /// Produce a reply for one logical completion call.
    async fn complete(&self, request: &CompletionRequest) -> CourierResult<CompletionReply>;

    /// Provider name (e.g. "openai").
    fn provider_name(&self) -> &'static str;

    /// Model identifier the driver sends requests to.
    fn model_name(&self) -> &str;
}

/// Fetch-shaped HTTP call-maker.
///
/// The retry layer drives this seam once per attempt; swapping the
/// implementation swaps the wire without touching retry or admission logic.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute one HTTP call and report the raw status and body.
    async fn send(&self, call: &HttpCall) -> Result<HttpReply, HttpError>;
}

/// Pluggable randomness for backoff jitter.
///
/// Injected so tests can assert exact delay values deterministically.
pub trait JitterSource: Send + Sync {
    /// Draw one multiplicative jitter factor, uniform in [0.8, 1.2].
    fn factor(&self) -> f64;
}
