//! Error types for admission control operations.

use std::fmt;

/// Error kinds for admission control operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdmissionErrorKind {
    /// The wait queue is at capacity; this call will never be granted a slot.
    QueueFull {
        /// Queue depth at the moment of rejection
        queued: usize,
        /// Total callers dropped since the limiter was created
        dropped: u64,
    },
    /// A granted slot could not be delivered to its waiter.
    SlotRevoked,
    /// A dispatched task finished without reporting a result.
    TaskLost,
}

impl fmt::Display for AdmissionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionErrorKind::QueueFull { queued, dropped } => write!(
                f,
                "Wait queue full: {} queued, {} dropped since boot",
                queued, dropped
            ),
            AdmissionErrorKind::SlotRevoked => write!(f, "Slot grant revoked before delivery"),
            AdmissionErrorKind::TaskLost => write!(f, "Dispatched task lost before completion"),
        }
    }
}

/// Admission control error with location tracking.
#[derive(Debug, Clone)]
pub struct AdmissionError {
    kind: AdmissionErrorKind,
    line: u32,
    file: &'static str,
}

impl AdmissionError {
    /// Create a new admission error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AdmissionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AdmissionErrorKind {
        &self.kind
    }

    /// Whether this error is the limiter's "queue full" rejection.
    ///
    /// Callers use this to tell graceful degradation apart from internal
    /// failures.
    pub fn is_queue_full(&self) -> bool {
        matches!(self.kind, AdmissionErrorKind::QueueFull { .. })
    }
}

impl fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Admission Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for AdmissionError {}

impl<T> From<T> for AdmissionError
where
    T: Into<AdmissionErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}
