//! Completion request types.

use crate::ConversationTurn;
use serde::{Deserialize, Serialize};

/// A logical completion call on behalf of one chat user.
///
/// # Examples
///
/// ```
/// use courier_core::{CompletionRequest, ConversationTurn};
///
/// let request = CompletionRequest::builder()
///     .user_id("42")
///     .text("What's the weather like?")
///     .context(vec![ConversationTurn::user("Hello")])
///     .locale_hint(Some("en-US".to_string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.user_id, "42");
/// assert_eq!(request.context.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, derive_builder::Builder)]
#[builder(setter(into), default)]
pub struct CompletionRequest {
    /// Identifier of the chat user this call is made for
    pub user_id: String,
    /// The new user text to complete against
    pub text: String,
    /// Prior turns of the conversation, oldest first
    #[serde(default)]
    pub context: Vec<ConversationTurn>,
    /// BCP 47-ish locale hint for locale-appropriate fallback text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale_hint: Option<String>,
}

impl CompletionRequest {
    /// Start building a request.
    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::default()
    }

    /// The most recent assistant turn's opaque response identifier, if any.
    ///
    /// This is the continuation anchor: when present, the upstream service
    /// can resume the conversation from it instead of replaying the full
    /// history. Absence is not an error.
    pub fn prior_response_id(&self) -> Option<&str> {
        self.context
            .iter()
            .rev()
            .find(|turn| turn.role == crate::Role::Assistant)
            .and_then(|turn| turn.response_id.as_deref())
    }
}
