//! TOML configuration for the admission layer.
//!
//! Bundled defaults ship with the crate (`include_str!` of courier.toml) and
//! an optional `./courier.toml` in the working directory overrides them.

use config::{Config, File, FileFormat};
use courier_error::{ConfigError, CourierError, CourierResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Admission and retry settings for the completion call path.
///
/// # Example
///
/// ```toml
/// [completion]
/// max_concurrency = 4
/// max_queue_size = 64
/// request_timeout_budget_ms = 60000
/// max_retries = 3
/// base_delay_ms = 1000
/// attempt_timeout_cap_ms = 30000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionSettings {
    /// Completion calls allowed in flight simultaneously
    #[serde(default = "defaults::max_concurrency")]
    pub max_concurrency: usize,

    /// Callers allowed to wait for a slot before overflow degrades
    #[serde(default = "defaults::max_queue_size")]
    pub max_queue_size: usize,

    /// Wall-clock budget for one logical call, all attempts included
    #[serde(default = "defaults::request_timeout_budget_ms")]
    pub request_timeout_budget_ms: u64,

    /// Upstream attempts before giving up
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay; doubles per attempt with jitter
    #[serde(default = "defaults::base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound on any single attempt's in-flight time
    #[serde(default = "defaults::attempt_timeout_cap_ms")]
    pub attempt_timeout_cap_ms: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            max_concurrency: defaults::max_concurrency(),
            max_queue_size: defaults::max_queue_size(),
            request_timeout_budget_ms: defaults::request_timeout_budget_ms(),
            max_retries: defaults::max_retries(),
            base_delay_ms: defaults::base_delay_ms(),
            attempt_timeout_cap_ms: defaults::attempt_timeout_cap_ms(),
        }
    }
}

impl CompletionSettings {
    /// The deadline budget as a [`Duration`].
    pub fn request_timeout_budget(&self) -> Duration {
        Duration::from_millis(self.request_timeout_budget_ms)
    }

    /// The initial backoff delay as a [`Duration`].
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// The per-attempt timeout cap as a [`Duration`].
    pub fn attempt_timeout_cap(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_cap_ms)
    }
}

/// Concurrency and rate budget for the outbound messaging dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Sends allowed in flight simultaneously
    #[serde(default = "defaults::max_parallel")]
    pub max_parallel: usize,

    /// Dispatch starts allowed per trailing second
    #[serde(default = "defaults::max_rps")]
    pub max_rps: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_parallel: defaults::max_parallel(),
            max_rps: defaults::max_rps(),
        }
    }
}

/// Top-level courier configuration.
///
/// # Examples
///
/// ```no_run
/// use courier_admission::CourierConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CourierConfig::load()?;
/// println!("in-flight cap: {}", config.completion.max_concurrency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CourierConfig {
    /// Completion call path settings
    #[serde(default)]
    pub completion: CompletionSettings,

    /// Outbound messaging dispatcher settings
    #[serde(default)]
    pub dispatch: DispatchSettings,
}

impl CourierConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> CourierResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                CourierError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CourierError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// A `courier.toml` in the current directory is optional and silently
    /// skipped when absent.
    #[instrument]
    pub fn load() -> CourierResult<Self> {
        debug!("Loading configuration with precedence: current dir > bundled defaults");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../courier.toml");

        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::with_name("courier").required(false))
            .build()
            .map_err(|e| {
                CourierError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CourierError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}

mod defaults {
    pub(super) fn max_concurrency() -> usize {
        4
    }

    pub(super) fn max_queue_size() -> usize {
        64
    }

    pub(super) fn request_timeout_budget_ms() -> u64 {
        60_000
    }

    pub(super) fn max_retries() -> u32 {
        3
    }

    pub(super) fn base_delay_ms() -> u64 {
        1_000
    }

    pub(super) fn attempt_timeout_cap_ms() -> u64 {
        30_000
    }

    pub(super) fn max_parallel() -> usize {
        2
    }

    pub(super) fn max_rps() -> usize {
        25
    }
}
