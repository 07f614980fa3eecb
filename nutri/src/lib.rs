//! Asynchronous analytics over a read-only health survey dataset.
//!
//! Clients submit analytical queries to a [`service::JobService`], which queues them as jobs
//! for a fixed pool of workers and lets clients poll for their results. Results are computed by
//! the [`aggregation::Aggregator`] over an immutable [`dataset::Dataset`] and persisted through
//! a [`store::results::ResultStore`], while job lifecycle states live in a
//! [`store::status::JobStatusStore`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use nutri::dataset::Dataset;
//! use nutri::error::NutriResult;
//! use nutri::jobs::{QueryKind, QueryParams};
//! use nutri::service::JobService;
//! use nutri::store::both::MemoryStore;
//!
//! # async fn example() -> NutriResult<()> {
//! let dataset = Arc::new(Dataset::load_csv("nutrition_activity_obesity_usa_subset.csv")?);
//! let store = MemoryStore::new();
//! let service = JobService::start(dataset, 4, store.clone(), store).await?;
//!
//! let params = QueryParams {
//!     question: "Percent of adults aged 18 years and older who have obesity".to_owned(),
//!     state: Some("Utah".to_owned()),
//! };
//! let job_id = service.submit(QueryKind::StateMean, params).await?;
//! let poll = service.poll(job_id).await?;
//!
//! service.initiate_shutdown().await?;
//! service.wait().await?;
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod concurrency;
pub mod dataset;
pub mod error;
mod macros;
pub mod jobs;
pub mod metrics;
pub mod service;
pub mod store;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod workers;
