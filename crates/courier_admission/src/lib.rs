//! Admission control and outbound dispatch scheduling.
//!
//! This crate provides the load-shedding layer between a concurrently-invoked
//! request handler and rate-limited third-party APIs:
//!
//! - [`ConcurrencyLimiter`] - a bounded semaphore with a capped FIFO wait
//!   queue and a drop policy, so bursts queue briefly and overflow degrades
//!   instead of crashing.
//! - [`DispatchQueue`] - a rate-limited, concurrency-capped dispatcher for
//!   outbound sends with two priority lanes sharing one [`SharedQuota`], so
//!   interactive replies never wait behind bulk deliveries.
//! - [`CourierConfig`] - TOML configuration with bundled defaults and
//!   working-directory overrides.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dispatch;
mod error;
mod hooks;
mod limiter;

pub use config::{CompletionSettings, CourierConfig, DispatchSettings};
pub use dispatch::{DispatchQueue, DispatchStats, Priority, SharedQuota};
pub use error::{AdmissionError, AdmissionErrorKind};
pub use hooks::AdmissionHooks;
pub use limiter::{ConcurrencyLimiter, LimiterStats, SlotPermit};
