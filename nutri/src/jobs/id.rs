use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Identifier of a submitted job.
///
/// Submitted jobs are numbered from 1. The value 0 is reserved for the shutdown sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(u64);

impl JobId {
    /// Id of the shutdown sentinel job.
    pub const SENTINEL: JobId = JobId(0);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn into_inner(self) -> u64 {
        self.0
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }
}

impl From<u64> for JobId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(JobId)
    }
}

/// Thread-safe source of job ids.
///
/// Ids are strictly increasing starting at 1, without gaps or reuse, regardless of how many
/// callers race on [`JobIdGenerator::next`].
#[derive(Debug, Default)]
pub struct JobIdGenerator {
    last: AtomicU64,
}

impl JobIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next job id.
    pub fn next(&self) -> JobId {
        JobId(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns the highest id allocated so far, [`JobId::SENTINEL`] if none was.
    pub fn current(&self) -> JobId {
        JobId(self.last.load(Ordering::SeqCst))
    }
}
