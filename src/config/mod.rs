//! Configuration management for parmap
//!
//! Pool sizing and progress display are read from layered sources (embedded
//! defaults, user and project files, environment) and extracted into
//! [`ParmapConfig`].

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

mod core;


/// Upper bound for `parallel.channel_buffer_multiplier`
pub const MAX_CHANNEL_BUFFER_MULTIPLIER: usize = 64;

/// Main configuration structure for parmap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParmapConfig {
    /// Worker pool settings
    pub parallel: ParallelSettings,

    /// Console progress settings
    pub progress: ProgressSettings,
}

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelSettings {
    /// Maximum number of worker threads (0 = no cap)
    pub max_threads: usize,

    /// Percentage of CPU cores to use (1-100)
    pub thread_percentage: u8,

    /// Channel buffer size multiplier (buffer = workers * multiplier)
    pub channel_buffer_multiplier: usize,
}

/// Progress bar configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    pub enabled: bool,

    /// Spinner refresh interval in milliseconds
    pub tick_ms: u64,
}

impl Default for ParallelSettings {
    fn default() -> Self {
        Self {
            max_threads: 0,
            thread_percentage: 100,
            channel_buffer_multiplier: 2,
        }
    }
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_ms: 100,
        }
    }
}

impl ParmapConfig {
    /// Reject settings the worker pool cannot honor
    pub fn validate(&self) -> Result<()> {
        let percentage = self.parallel.thread_percentage;
        if percentage == 0 || percentage > 100 {
            bail!("parallel.thread_percentage must be between 1 and 100, got {percentage}");
        }
        let multiplier = self.parallel.channel_buffer_multiplier;
        if multiplier == 0 || multiplier > MAX_CHANNEL_BUFFER_MULTIPLIER {
            bail!(
                "parallel.channel_buffer_multiplier must be between 1 and {MAX_CHANNEL_BUFFER_MULTIPLIER}, got {multiplier}"
            );
        }
        Ok(())
    }
}
