//! Conversation turn types.

use crate::Role;
use serde::{Deserialize, Serialize};

/// One prior turn of a conversation.
///
/// Assistant turns may carry the opaque response identifier returned by the
/// upstream completion service; when the latest assistant turn has one, the
/// next request threads it through so the service can resume from it.
///
/// # Examples
///
/// ```
/// use courier_core::{ConversationTurn, Role};
///
/// let turn = ConversationTurn::assistant("Hi! How can I help?")
///     .with_response_id("resp_abc123");
/// assert_eq!(turn.role, Role::Assistant);
/// assert_eq!(turn.response_id.as_deref(), Some("resp_abc123"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who authored the turn
    pub role: Role,
    /// The turn's text content
    pub text: String,
    /// Opaque upstream response identifier, present on assistant turns only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
}

impl ConversationTurn {
    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            response_id: None,
        }
    }

    /// Create an assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            response_id: None,
        }
    }

    /// Attach the upstream response identifier to this turn.
    pub fn with_response_id(mut self, id: impl Into<String>) -> Self {
        self.response_id = Some(id.into());
        self
    }
}
