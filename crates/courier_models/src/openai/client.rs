//! Deadline-budgeted retrying completion client.
//!
//! One logical `complete` call owns a single wall-clock budget covering
//! every attempt, every queue wait, and every backoff sleep. Exceeding the
//! budget anywhere is a hard failure, never silently extended. Overload is
//! different: when the admission queue is full the call resolves with a
//! degraded apology reply instead of an error, so transient bursts degrade
//! the conversation rather than break it.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use courier_admission::{
    AdmissionHooks, CompletionSettings, ConcurrencyLimiter, CourierConfig, LimiterStats,
};
use courier_core::{CompletionReply, CompletionRequest, ReplyMetadata};
use courier_error::{
    CompletionError, CompletionErrorKind, CourierResult, RetryableError,
};
use courier_interface::{CompletionDriver, HttpCall, HttpReply, HttpTransport, JitterSource};

use super::extract;
use super::fallback::degraded_reply;
use super::wire::{WireRequest, WireResponse};

const RESPONSES_URL: &str = "https://api.openai.com/v1/responses";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Forwards admission events to the tracing subscriber.
struct TracingHooks;

impl AdmissionHooks for TracingHooks {
    fn on_queue(&self, stats: &LimiterStats) {
        debug!(
            queued = stats.queued,
            active = stats.active,
            "completion call waiting for a slot"
        );
    }

    fn on_acquire(&self, stats: &LimiterStats, queue_wait: Duration) {
        debug!(
            active = stats.active,
            queue_wait_ms = queue_wait.as_millis() as u64,
            "completion slot acquired"
        );
    }

    fn on_drop(&self, stats: &LimiterStats) {
        warn!(
            queued = stats.queued,
            dropped = stats.dropped,
            "completion queue overflow"
        );
    }
}

/// Completion client with admission control, deadline budgeting, and
/// jittered exponential backoff.
///
/// Generic over the HTTP transport and the jitter source so tests can swap
/// in scripted doubles and assert exact delays.
pub struct RetryingCompletionClient<T, J> {
    transport: T,
    jitter: J,
    limiter: ConcurrencyLimiter,
    settings: CompletionSettings,
    model: String,
    endpoint: String,
}

impl<T, J> std::fmt::Debug for RetryingCompletionClient<T, J> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingCompletionClient")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<T, J> RetryingCompletionClient<T, J>
where
    T: HttpTransport,
    J: JitterSource,
{
    /// Create a client over the given transport and jitter source.
    pub fn new(settings: CompletionSettings, transport: T, jitter: J) -> Self {
        let limiter = ConcurrencyLimiter::new(settings.max_concurrency, settings.max_queue_size);
        Self {
            transport,
            jitter,
            limiter,
            settings,
            model: DEFAULT_MODEL.to_string(),
            endpoint: RESPONSES_URL.to_string(),
        }
    }

    /// Override the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// The admission limiter, for health checks and diagnostics endpoints.
    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    /// Internal completion loop returning completion-specific errors.
    async fn complete_internal(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionReply, CompletionError> {
        let deadline = Instant::now() + self.settings.request_timeout_budget();
        let mut attempt: u32 = 0;
        let mut last_retryable: Option<CompletionError> = None;

        while attempt < self.settings.max_retries && Instant::now() < deadline {
            let permit = match self.limiter.acquire_with_hooks(&TracingHooks).await {
                Ok(permit) => permit,
                Err(err) if err.is_queue_full() => {
                    warn!(user_id = %request.user_id, "overloaded, returning degraded reply");
                    return Ok(degraded_reply(request.locale_hint.as_deref()));
                }
                Err(err) => {
                    return Err(CompletionError::new(CompletionErrorKind::Admission(
                        err.to_string(),
                    )));
                }
            };

            // time spent queued may have consumed the whole budget
            let now = Instant::now();
            if now > deadline {
                permit.release();
                return Err(CompletionError::new(CompletionErrorKind::DeadlineExceeded(
                    self.settings.request_timeout_budget_ms,
                )));
            }

            let attempt_timeout = deadline
                .saturating_duration_since(now)
                .min(self.settings.attempt_timeout_cap());
            let call = self.build_call(request)?;
            debug!(
                attempt,
                timeout_ms = attempt_timeout.as_millis() as u64,
                "issuing upstream attempt"
            );

            let outcome = tokio::time::timeout(attempt_timeout, self.transport.send(&call)).await;
            permit.release();

            let error = match outcome {
                Ok(Ok(reply)) if reply.is_success() => {
                    return self.parse_reply(request, &reply);
                }
                Ok(Ok(reply)) => {
                    let error = CompletionError::new(CompletionErrorKind::Http {
                        status: reply.status,
                        message: truncate_body(&reply.body),
                    });
                    if !error.is_retryable() {
                        return Err(error);
                    }
                    error
                }
                Ok(Err(transport_error)) => {
                    CompletionError::new(CompletionErrorKind::Network(transport_error.message))
                }
                Err(_elapsed) => CompletionError::new(CompletionErrorKind::AttemptTimeout(
                    attempt_timeout.as_millis() as u64,
                )),
            };

            let delay = self.backoff_delay(attempt, deadline);
            warn!(
                attempt,
                error = %error,
                delay_ms = delay.as_millis() as u64,
                "retryable upstream failure"
            );
            last_retryable = Some(error);
            attempt += 1;
            if attempt >= self.settings.max_retries {
                break;
            }
            tokio::time::sleep(delay).await;
        }

        Err(CompletionError::new(CompletionErrorKind::BudgetExhausted {
            attempts: attempt,
            last_error: last_retryable
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempts were made".to_string()),
        }))
    }

    /// Backoff for the attempt that just failed, clamped to the remaining
    /// budget: `base_delay * 2^attempt * jitter`, jitter uniform in
    /// [0.8, 1.2].
    fn backoff_delay(&self, attempt: u32, deadline: Instant) -> Duration {
        let factor = self.jitter.factor().clamp(0.8, 1.2);
        let doubling = 2f64.powi(attempt.min(16) as i32);
        let raw = self.settings.base_delay().mul_f64(doubling * factor);
        raw.min(deadline.saturating_duration_since(Instant::now()))
    }

    fn build_call(&self, request: &CompletionRequest) -> Result<HttpCall, CompletionError> {
        let wire = WireRequest::from_request(&self.model, request);
        let body = serde_json::to_value(&wire)
            .map_err(|e| CompletionError::new(CompletionErrorKind::Parse(e.to_string())))?;
        Ok(HttpCall {
            url: self.endpoint.clone(),
            body,
        })
    }

    fn parse_reply(
        &self,
        request: &CompletionRequest,
        reply: &HttpReply,
    ) -> Result<CompletionReply, CompletionError> {
        let wire: WireResponse = serde_json::from_str(&reply.body)
            .map_err(|e| CompletionError::new(CompletionErrorKind::Parse(e.to_string())))?;
        let (text, used_fallback_extraction) = extract::reply_text(&wire)?;
        Ok(CompletionReply {
            text,
            metadata: ReplyMetadata {
                response_id: wire.id,
                request_status: wire.status,
                used_fallback_extraction,
                degraded: false,
                reason: None,
                prior_response_id: request.prior_response_id().map(str::to_string),
            },
        })
    }
}

impl RetryingCompletionClient<crate::ReqwestTransport, crate::UniformJitter> {
    /// Production wiring: settings from `courier.toml`, reqwest transport
    /// authenticated from `OPENAI_API_KEY`, thread-local jitter.
    pub fn from_env() -> CourierResult<Self> {
        let settings = CourierConfig::load()?.completion;
        let transport = crate::ReqwestTransport::from_env()?;
        Ok(Self::new(settings, transport, crate::UniformJitter))
    }
}

#[async_trait]
impl<T, J> CompletionDriver for RetryingCompletionClient<T, J>
where
    T: HttpTransport,
    J: JitterSource,
{
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    async fn complete(&self, request: &CompletionRequest) -> CourierResult<CompletionReply> {
        self.complete_internal(request).await.map_err(Into::into)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Bound the upstream body carried inside error messages.
fn truncate_body(body: &str) -> String {
    const MAX_CHARS: usize = 300;
    if body.chars().count() <= MAX_CHARS {
        body.to_string()
    } else {
        body.chars().take(MAX_CHARS).collect()
    }
}
