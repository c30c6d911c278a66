//! OpenAI-style responses API client.
//!
//! The wire format follows the responses endpoint: role-tagged `input`
//! turns, an opaque `previous_response_id` for conversation continuation,
//! and replies carrying either a consolidated `output_text` field or a
//! structured `output` array of text fragments.

mod client;
mod extract;
mod fallback;
mod wire;

pub use client::RetryingCompletionClient;
pub use wire::{WireFragment, WireOutputItem, WireRequest, WireResponse, WireTurn};
