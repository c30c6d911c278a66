//! Error types for the courier call broker.
//!
//! This crate provides the foundation error types used throughout the courier
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use courier_error::{CourierResult, HttpError};
//!
//! fn fetch_data() -> CourierResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! match fetch_data() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod completion;
mod config;
mod error;
mod http;

pub use completion::{CompletionError, CompletionErrorKind, RetryableError};
pub use config::ConfigError;
pub use error::{CourierError, CourierErrorKind, CourierResult};
pub use http::HttpError;
