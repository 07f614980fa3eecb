use nutri_config::Config;
use nutri_config::shared::{DatasetConfig, ResultStoreConfig, ValidationError, WorkerPoolConfig};
use serde::Deserialize;

/// Complete configuration of the API service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// HTTP server settings.
    pub application: ApplicationSettings,
    /// Survey dataset loaded at startup.
    pub dataset: DatasetConfig,
    /// Sizing of the job worker pool.
    #[serde(default)]
    pub workers: WorkerPoolConfig,
    /// Where job results are written.
    #[serde(default)]
    pub results: ResultStoreConfig,
}

impl ApiConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.dataset.validate()?;
        self.workers.validate()?;
        self.results.validate()?;

        Ok(())
    }
}

impl Config for ApiConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}

/// Address the HTTP server binds to.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    /// Host the server binds to, for example `127.0.0.1` or `0.0.0.0`.
    pub host: String,
    /// Port the server binds to, `0` picks a free port.
    pub port: u16,
}
