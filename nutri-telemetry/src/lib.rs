//! Logging and metrics setup shared by the service binaries and tests.

pub mod metrics;
pub mod tracing;
