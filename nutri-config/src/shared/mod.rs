//! Configuration types shared by the service binaries.

mod base;
mod dataset;
mod results;
mod workers;

pub use base::ValidationError;
pub use dataset::DatasetConfig;
pub use results::ResultStoreConfig;
pub use workers::{NUM_OF_THREADS_ENV_NAME, WorkerPoolConfig};
