//! Utilities for testing the job service and the aggregation engine.
//!
//! Available in unit tests and, behind the `test-utils` feature, to integration tests and
//! downstream crates.

pub mod dataset;
pub mod service;
