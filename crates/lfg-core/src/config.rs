//! lfg.toml simulation config parser.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Upper bound on a single dungeon run, in seconds.
pub const MAX_DURATION_SECS: u32 = 15;

/// Default overall deadline for a simulation, in seconds.
pub const DEFAULT_DEADLINE_SECS: u64 = 20;

/// Default countdown tick, in milliseconds.
pub const DEFAULT_TICK_MILLIS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Maximum number of concurrent dungeon instances.
    pub instances: u32,
    pub tanks: u32,
    pub healers: u32,
    pub dps: u32,
    /// Shortest dungeon run, in seconds.
    pub min_duration_secs: u32,
    /// Longest dungeon run, in seconds.
    pub max_duration_secs: u32,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    /// Real time per countdown second. Lower it to replay a run faster.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
    /// Fixed RNG seed for reproducible durations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_deadline_secs() -> u64 {
    DEFAULT_DEADLINE_SECS
}

fn default_tick_millis() -> u64 {
    DEFAULT_TICK_MILLIS
}

impl SimConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SimConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// A starter config: two instances and a queue that forms three parties.
    pub fn scaffold() -> Self {
        SimConfig {
            instances: 2,
            tanks: 3,
            healers: 3,
            dps: 9,
            min_duration_secs: 1,
            max_duration_secs: 5,
            deadline_secs: DEFAULT_DEADLINE_SECS,
            tick_millis: DEFAULT_TICK_MILLIS,
            seed: None,
        }
    }

    /// Reject configs the simulation cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.instances < 1 {
            return Err(ConfigError::NoInstances);
        }
        if self.min_duration_secs < 1 {
            return Err(ConfigError::MinDurationTooShort(self.min_duration_secs));
        }
        if self.max_duration_secs < self.min_duration_secs {
            return Err(ConfigError::MaxBelowMin {
                min: self.min_duration_secs,
                max: self.max_duration_secs,
            });
        }
        if self.max_duration_secs > MAX_DURATION_SECS {
            return Err(ConfigError::MaxDurationTooLong(self.max_duration_secs));
        }
        if self.deadline_secs == 0 {
            return Err(ConfigError::ZeroDeadline);
        }
        if self.tick_millis == 0 {
            return Err(ConfigError::ZeroTick);
        }
        Ok(())
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    /// Number of parties the queues can form: `min(tanks, healers, dps / 3)`.
    pub fn expected_parties(&self) -> u32 {
        self.tanks.min(self.healers).min(self.dps / 3)
    }
}
