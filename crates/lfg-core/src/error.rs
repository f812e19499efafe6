//! Configuration error types.

use thiserror::Error;

use crate::config::MAX_DURATION_SECS;

/// A simulation config that must be rejected before anything runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("number of concurrent instances must be at least 1")]
    NoInstances,

    #[error("minimum dungeon time must be at least 1 second (got {0})")]
    MinDurationTooShort(u32),

    #[error("maximum dungeon time {max}s is below the minimum {min}s")]
    MaxBelowMin { min: u32, max: u32 },

    #[error("maximum dungeon time must not exceed {limit}s (got {0})", limit = MAX_DURATION_SECS)]
    MaxDurationTooLong(u32),

    #[error("deadline must be at least 1 second")]
    ZeroDeadline,

    #[error("tick interval must be at least 1 millisecond")]
    ZeroTick,

    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
