use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Environment variable overriding the number of workers, kept for compatibility with
/// existing deployments.
pub const NUM_OF_THREADS_ENV_NAME: &str = "TP_NUM_OF_THREADS";

/// Sizing of the job worker pool.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct WorkerPoolConfig {
    /// Requested number of workers. When absent, the pool uses the host's available
    /// parallelism.
    #[serde(default)]
    pub num_workers: Option<usize>,
}

impl WorkerPoolConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.num_workers == Some(0) {
            return Err(ValidationError::NumWorkersZero);
        }

        Ok(())
    }

    /// Applies the [`NUM_OF_THREADS_ENV_NAME`] override, if set.
    pub fn with_env_override(mut self) -> Result<Self, ValidationError> {
        if let Ok(value) = std::env::var(NUM_OF_THREADS_ENV_NAME) {
            self.num_workers = Some(parse_num_workers(NUM_OF_THREADS_ENV_NAME, &value)?);
        }

        Ok(self)
    }

    /// Returns the number of workers to spawn on this host.
    pub fn resolve_pool_size(&self) -> usize {
        let available = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);

        self.resolve_pool_size_with(available)
    }

    /// Returns the number of workers to spawn given `available` parallelism.
    ///
    /// The requested size is clamped to `[1, available]`.
    pub fn resolve_pool_size_with(&self, available: usize) -> usize {
        let available = available.max(1);

        match self.num_workers {
            Some(requested) => requested.clamp(1, available),
            None => available,
        }
    }
}

fn parse_num_workers(name: &'static str, value: &str) -> Result<usize, ValidationError> {
    match value.trim().parse::<usize>() {
        Ok(num_workers) if num_workers > 0 => Ok(num_workers),
        _ => Err(ValidationError::InvalidEnvOverride {
            name,
            value: value.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_size_defaults_to_available_parallelism() {
        let config = WorkerPoolConfig::default();

        assert_eq!(config.resolve_pool_size_with(8), 8);
    }

    #[test]
    fn test_pool_size_never_exceeds_available_parallelism() {
        let config = WorkerPoolConfig {
            num_workers: Some(32),
        };
        assert_eq!(config.resolve_pool_size_with(4), 4);

        let config = WorkerPoolConfig {
            num_workers: Some(2),
        };
        assert_eq!(config.resolve_pool_size_with(4), 2);
    }

    #[test]
    fn test_zero_workers_is_invalid() {
        let config = WorkerPoolConfig {
            num_workers: Some(0),
        };

        assert_eq!(config.validate(), Err(ValidationError::NumWorkersZero));
        assert_eq!(config.resolve_pool_size_with(4), 1);
    }

    #[test]
    fn test_parse_num_workers() {
        assert_eq!(parse_num_workers(NUM_OF_THREADS_ENV_NAME, " 3 "), Ok(3));
        assert!(parse_num_workers(NUM_OF_THREADS_ENV_NAME, "0").is_err());
        assert!(parse_num_workers(NUM_OF_THREADS_ENV_NAME, "many").is_err());
    }
}
