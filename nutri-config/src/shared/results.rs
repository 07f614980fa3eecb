use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Where job results are persisted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ResultStoreConfig {
    /// Directory receiving one file per completed job.
    #[serde(default = "default_results_directory")]
    pub directory: PathBuf,
}

impl ResultStoreConfig {
    /// Default directory for job results.
    pub const DEFAULT_DIRECTORY: &'static str = "results";

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.directory.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath("results.directory"));
        }

        Ok(())
    }
}

impl Default for ResultStoreConfig {
    fn default() -> Self {
        Self {
            directory: default_results_directory(),
        }
    }
}

fn default_results_directory() -> PathBuf {
    PathBuf::from(ResultStoreConfig::DEFAULT_DIRECTORY)
}
