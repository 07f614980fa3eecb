use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The worker pool cannot be empty.
    #[error("`workers.num_workers` cannot be zero")]
    NumWorkersZero,
    /// A required path is empty.
    #[error("`{0}` cannot be empty")]
    EmptyPath(&'static str),
    /// An environment override could not be parsed.
    #[error("invalid value `{value}` for `{name}`: expected a positive integer")]
    InvalidEnvOverride { name: &'static str, value: String },
}
