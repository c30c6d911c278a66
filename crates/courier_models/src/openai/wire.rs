//! Wire DTOs for the responses endpoint.

use courier_core::{CompletionRequest, Role};
use serde::{Deserialize, Serialize};

/// Request body for the responses endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRequest {
    /// Model identifier
    pub model: String,
    /// Role-tagged input turns, oldest first
    pub input: Vec<WireTurn>,
    /// Continuation anchor from the latest assistant turn, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
}

/// One role-tagged input turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTurn {
    /// "system", "user" or "assistant"
    pub role: String,
    /// Turn text
    pub content: String,
}

impl WireRequest {
    /// Build the wire request for one logical completion call.
    ///
    /// When the caller's context carries a continuation identifier, the
    /// upstream service resumes from it and only the new user text is sent;
    /// otherwise the full context is replayed.
    pub fn from_request(model: &str, request: &CompletionRequest) -> Self {
        let previous_response_id = request.prior_response_id().map(str::to_string);

        let mut input = Vec::new();
        if previous_response_id.is_none() {
            for turn in &request.context {
                input.push(WireTurn {
                    role: role_name(turn.role).to_string(),
                    content: turn.text.clone(),
                });
            }
        }
        input.push(WireTurn {
            role: "user".to_string(),
            content: request.text.clone(),
        });

        Self {
            model: model.to_string(),
            input,
            previous_response_id,
        }
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Response body from the responses endpoint.
///
/// All fields are optional or defaulted; the extraction layer decides what
/// counts as a usable reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireResponse {
    /// Opaque response identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Request status string, e.g. "completed"
    #[serde(default)]
    pub status: Option<String>,
    /// Consolidated reply text, when the service provides one
    #[serde(default)]
    pub output_text: Option<String>,
    /// Structured output items, in document order
    #[serde(default)]
    pub output: Vec<WireOutputItem>,
}

/// One structured output item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireOutputItem {
    /// Item type, e.g. "message"
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Content fragments, in document order
    #[serde(default)]
    pub content: Vec<WireFragment>,
}

/// One content fragment within an output item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFragment {
    /// Fragment type; only "output_text" fragments carry reply text
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Fragment text
    #[serde(default)]
    pub text: String,
}
