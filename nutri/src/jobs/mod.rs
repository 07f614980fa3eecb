//! Job model: identifiers, query descriptions, and lifecycle states.

mod id;
mod job;
mod status;

pub use id::{JobId, JobIdGenerator};
pub use job::{Job, JobTask, Query, QueryKind, QueryParams};
pub use status::JobStatus;
