//! Completion-call error types and retry classification.

/// Completion-specific error conditions.
///
/// The variants map onto the broker's failure taxonomy: retryable upstream
/// trouble (`Http` 429/5xx, `Network`, `AttemptTimeout`), terminal upstream
/// trouble (other `Http` statuses, `EmptyReply`, `Parse`), and local budget
/// failures (`DeadlineExceeded`, `BudgetExhausted`). Queue overflow is not an
/// error at all; it resolves to a degraded reply at the client layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CompletionErrorKind {
    /// API key not found in environment
    #[display("OPENAI_API_KEY environment variable not set")]
    MissingApiKey,
    /// Upstream returned a non-success HTTP status
    #[display("upstream returned HTTP {}: {}", status, message)]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body or error message
        message: String,
    },
    /// The request never produced an HTTP status (DNS, TLS, connection reset)
    #[display("network error: {}", _0)]
    Network(String),
    /// A single attempt exceeded its local cancellation deadline
    #[display("attempt cancelled after {} ms", _0)]
    AttemptTimeout(u64),
    /// The wall-clock deadline budget for the whole call was exceeded
    #[display("deadline budget of {} ms exceeded", _0)]
    DeadlineExceeded(u64),
    /// Retries or budget ran out; carries the last retryable error seen
    #[display("gave up after {} attempts: {}", attempts, last_error)]
    BudgetExhausted {
        /// Number of attempts issued before giving up
        attempts: u32,
        /// Display form of the last retryable error, for diagnostics
        last_error: String,
    },
    /// Upstream answered successfully but carried no usable text
    #[display("upstream reply contained no usable text")]
    EmptyReply,
    /// Upstream response body could not be parsed
    #[display("failed to parse upstream reply: {}", _0)]
    Parse(String),
    /// The admission layer failed in an unexpected way
    #[display("admission failure: {}", _0)]
    Admission(String),
}

impl CompletionErrorKind {
    /// Check if this error type should be retried.
    ///
    /// HTTP 429 and 5xx, network failures, and per-attempt timeouts are
    /// transient. Everything else fails the call immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            CompletionErrorKind::Http { status, .. } => {
                matches!(*status, 429 | 500..=599)
            }
            CompletionErrorKind::Network(_) => true,
            CompletionErrorKind::AttemptTimeout(_) => true,
            _ => false,
        }
    }
}

/// Completion error with source location tracking.
///
/// # Examples
///
/// ```
/// use courier_error::{CompletionError, CompletionErrorKind};
///
/// let err = CompletionError::new(CompletionErrorKind::EmptyReply);
/// assert!(format!("{}", err).contains("no usable text"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Completion Error: {} at line {} in {}", kind, line, file)]
pub struct CompletionError {
    /// The kind of error that occurred
    pub kind: CompletionErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CompletionError {
    /// Create a new CompletionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CompletionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry classification.
///
/// Transient errors like 503 (service unavailable), 429 (rate limit), or
/// network timeouts return true. Permanent errors like 401 (unauthorized)
/// or 400 (bad request) return false.
///
/// # Examples
///
/// ```
/// use courier_error::{CompletionError, CompletionErrorKind, RetryableError};
///
/// let err = CompletionError::new(CompletionErrorKind::Http {
///     status: 503,
///     message: "Service unavailable".to_string(),
/// });
/// assert!(err.is_retryable());
///
/// let err = CompletionError::new(CompletionErrorKind::Http {
///     status: 400,
///     message: "Bad request".to_string(),
/// });
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for CompletionError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
