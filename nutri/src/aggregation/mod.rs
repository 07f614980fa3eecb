//! The analytical operations supported by the service.
//!
//! Every operation is a pure function of the shared [`crate::dataset::Dataset`] and a
//! [`crate::jobs::Query`]. Running the same query twice yields an identical result, including
//! the order of its entries.

mod engine;
mod result;

pub use engine::Aggregator;
pub use result::{QueryResult, category_key, state_category_key};
