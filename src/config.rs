//! Runtime settings for locating the w1 sysfs interface.
//!
//! The base device path and the "no kernel module" switch are explicit
//! configuration values threaded through discovery and the readiness check
//! instead of process-global state, so tests can point the library at a
//! mocked device tree without mutating anything shared.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment};
use serde::Deserialize;

use crate::error::W1Result;

/// Where the kernel modules expose the connected devices.
pub const DEFAULT_BASE_DIRECTORY: &str = "/sys/bus/w1/devices";

/// How many times the interface and the first sensor are polled for.
pub const RETRY_ATTEMPTS: u32 = 10;

/// Environment variable prefix consumed by [`Settings::from_env`].
pub const ENV_PREFIX: &str = "W1THERM";

/// A bounded retry policy: a fixed number of attempts with a fixed delay.
///
/// Carried by [`Settings`] so the readiness poll and the first-sensor scan
/// can be swapped for a zero-delay policy in tests without changing any
/// call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts before giving up.
    pub attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// The hardware-facing policy: 10 attempts spread over roughly a second.
    pub fn standard() -> Self {
        Self {
            attempts: RETRY_ATTEMPTS,
            delay: Duration::from_secs_f64(1.0 / RETRY_ATTEMPTS as f64),
        }
    }

    /// Same attempt budget without sleeping, for mocked device trees.
    pub fn no_delay() -> Self {
        Self {
            attempts: RETRY_ATTEMPTS,
            delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Context value passed to discovery and readiness-check operations.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory scanned for device entries.
    pub base_directory: PathBuf,
    /// Whether the readiness protocol may issue `modprobe` and poll for the
    /// interface. Suppressed in test or mocked environments.
    pub auto_load_modules: bool,
    /// Retry policy for the readiness poll and the first-sensor scan.
    pub retry: RetryPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::from(DEFAULT_BASE_DIRECTORY),
            auto_load_modules: true,
            retry: RetryPolicy::standard(),
        }
    }
}

/// Raw environment view; all fields optional, defaults applied on top.
#[derive(Debug, Deserialize)]
struct EnvSettings {
    base_directory: Option<PathBuf>,
    no_kernel_module: Option<String>,
}

impl Settings {
    /// Builds settings from `W1THERM_*` environment variables.
    ///
    /// * `W1THERM_BASE_DIRECTORY` overrides the scan root.
    /// * `W1THERM_NO_KERNEL_MODULE=1` suppresses the automatic module load,
    ///   for test and mocked environments. Any other value keeps it enabled.
    pub fn from_env() -> W1Result<Self> {
        let env: EnvSettings = Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        let mut settings = Settings::default();
        if let Some(base_directory) = env.base_directory {
            settings.base_directory = base_directory;
        }
        if env.no_kernel_module.as_deref() == Some("1") {
            settings.auto_load_modules = false;
        }
        Ok(settings)
    }

    /// Replaces the scan root, keeping everything else.
    pub fn with_base_directory(mut self, base_directory: impl Into<PathBuf>) -> Self {
        self.base_directory = base_directory.into();
        self
    }

    /// Disables the automatic kernel module load.
    pub fn without_kernel_module(mut self) -> Self {
        self.auto_load_modules = false;
        self
    }

    /// Replaces the retry policy, keeping everything else.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
