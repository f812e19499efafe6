//! Scheduler error types.

use thiserror::Error;

/// Errors that can stop a simulation from producing a report.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] lfg_core::ConfigError),

    #[error("runtime error: {0}")]
    Runtime(#[from] lfg_runtime::RuntimeError),

    #[error("dungeon run task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
