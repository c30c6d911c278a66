//! Upstream model clients for the courier call broker.
//!
//! This crate provides the completion side of the broker: a retrying,
//! deadline-budgeted client over an OpenAI-style responses API, the
//! reqwest-backed production transport, and the default backoff jitter
//! source. Admission control comes from `courier_admission`; every upstream
//! attempt holds a limiter slot for exactly its in-flight duration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod jitter;
pub mod openai;
mod transport;

pub use jitter::UniformJitter;
pub use openai::RetryingCompletionClient;
pub use transport::ReqwestTransport;
