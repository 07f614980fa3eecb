//! Storage of job statuses and job results.
//!
//! Both concerns are expressed as traits so that the worker pool and the service can be driven
//! by the in-memory store in tests and by the filesystem store in production.

pub mod both;
pub mod results;
pub mod status;
