//! Core data types for the courier call broker.
//!
//! This crate provides the foundation data types used across the courier
//! workspace: conversation turns, completion requests, and completion
//! replies with their delivery metadata.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod reply;
mod request;
mod role;
mod telemetry;
mod turn;

pub use reply::{CompletionReply, ReplyMetadata};
pub use request::{CompletionRequest, CompletionRequestBuilder};
pub use role::Role;
pub use telemetry::init_telemetry;
pub use turn::ConversationTurn;
