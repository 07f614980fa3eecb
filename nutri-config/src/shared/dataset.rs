use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Location of the survey dataset loaded at startup.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DatasetConfig {
    /// Path of the CSV export, relative to the working directory unless absolute.
    pub path: PathBuf,
}

impl DatasetConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath("dataset.path"));
        }

        Ok(())
    }
}
