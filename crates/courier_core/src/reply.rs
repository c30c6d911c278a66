//! Completion reply types.

use serde::{Deserialize, Serialize};

/// Delivery metadata attached to a completion reply.
///
/// # Examples
///
/// ```
/// use courier_core::ReplyMetadata;
///
/// let meta = ReplyMetadata::default();
/// assert!(!meta.degraded);
/// assert!(meta.response_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReplyMetadata {
    /// Opaque upstream response identifier, for conversation continuation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    /// Upstream request status string (e.g. "completed"), verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_status: Option<String>,
    /// True when the reply text came from fragment concatenation rather than
    /// the consolidated text field
    #[serde(default)]
    pub used_fallback_extraction: bool,
    /// True when the reply is a designed fallback under overload, not an
    /// upstream answer
    #[serde(default)]
    pub degraded: bool,
    /// Machine-readable reason for a degraded reply (e.g. "queue_overflow")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// The continuation identifier that was threaded into this request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_response_id: Option<String>,
}

/// The text produced by a completion call plus its delivery metadata.
///
/// # Examples
///
/// ```
/// use courier_core::{CompletionReply, ReplyMetadata};
///
/// let reply = CompletionReply {
///     text: "Hello!".to_string(),
///     metadata: ReplyMetadata::default(),
/// };
/// assert_eq!(reply.text, "Hello!");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionReply {
    /// The reply text to send back to the user
    pub text: String,
    /// Delivery metadata
    pub metadata: ReplyMetadata,
}
