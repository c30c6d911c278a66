//! Trait seams for the courier call broker.
//!
//! This crate defines the boundaries between the admission/retry layer and
//! its collaborators: the upstream completion backend, the HTTP call-maker,
//! and the backoff jitter source. Production wiring and test doubles both
//! implement these traits.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{CompletionDriver, HttpTransport, JitterSource};
pub use types::{HttpCall, HttpReply};
