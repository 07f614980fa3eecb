use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bail;
use crate::error::{ErrorKind, NutriError, NutriResult};
use crate::jobs::JobId;

/// The nine analytical operations a client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    StatesMean,
    StateMean,
    Best5,
    Worst5,
    GlobalMean,
    DiffFromMean,
    StateDiffFromMean,
    MeanByCategory,
    StateMeanByCategory,
}

impl QueryKind {
    pub const ALL: [QueryKind; 9] = [
        QueryKind::StatesMean,
        QueryKind::StateMean,
        QueryKind::Best5,
        QueryKind::Worst5,
        QueryKind::GlobalMean,
        QueryKind::DiffFromMean,
        QueryKind::StateDiffFromMean,
        QueryKind::MeanByCategory,
        QueryKind::StateMeanByCategory,
    ];

    /// Returns the name clients use to request the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::StatesMean => "states_mean",
            QueryKind::StateMean => "state_mean",
            QueryKind::Best5 => "best5",
            QueryKind::Worst5 => "worst5",
            QueryKind::GlobalMean => "global_mean",
            QueryKind::DiffFromMean => "diff_from_mean",
            QueryKind::StateDiffFromMean => "state_diff_from_mean",
            QueryKind::MeanByCategory => "mean_by_category",
            QueryKind::StateMeanByCategory => "state_mean_by_category",
        }
    }

    /// Returns `true` if the operation is scoped to a single state.
    pub fn requires_state(&self) -> bool {
        matches!(
            self,
            QueryKind::StateMean | QueryKind::StateDiffFromMean | QueryKind::StateMeanByCategory
        )
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryKind {
    type Err = NutriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match QueryKind::ALL.iter().find(|kind| kind.as_str() == s) {
            Some(kind) => Ok(*kind),
            None => bail!(
                ErrorKind::UnknownQueryKind,
                "Unknown query kind",
                format!("'{s}' is not a supported operation")
            ),
        }
    }
}

/// Parameters attached to a query request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub question: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// A fully validated analytical query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    StatesMean { question: String },
    StateMean { question: String, state: String },
    Best5 { question: String },
    Worst5 { question: String },
    GlobalMean { question: String },
    DiffFromMean { question: String },
    StateDiffFromMean { question: String, state: String },
    MeanByCategory { question: String },
    StateMeanByCategory { question: String, state: String },
}

impl Query {
    /// Builds a query of `kind` from request parameters.
    ///
    /// State-scoped operations fail with [`ErrorKind::InvalidJobParameters`] when no state is
    /// given. A state passed to an operation that does not use one is ignored.
    pub fn new(kind: QueryKind, params: QueryParams) -> NutriResult<Self> {
        let QueryParams { question, state } = params;

        let state = match (kind.requires_state(), state) {
            (true, Some(state)) => state,
            (true, None) => bail!(
                ErrorKind::InvalidJobParameters,
                "Missing state parameter",
                format!("operation '{kind}' requires a state")
            ),
            (false, _) => String::new(),
        };

        let query = match kind {
            QueryKind::StatesMean => Query::StatesMean { question },
            QueryKind::StateMean => Query::StateMean { question, state },
            QueryKind::Best5 => Query::Best5 { question },
            QueryKind::Worst5 => Query::Worst5 { question },
            QueryKind::GlobalMean => Query::GlobalMean { question },
            QueryKind::DiffFromMean => Query::DiffFromMean { question },
            QueryKind::StateDiffFromMean => Query::StateDiffFromMean { question, state },
            QueryKind::MeanByCategory => Query::MeanByCategory { question },
            QueryKind::StateMeanByCategory => Query::StateMeanByCategory { question, state },
        };

        Ok(query)
    }

    pub fn kind(&self) -> QueryKind {
        match self {
            Query::StatesMean { .. } => QueryKind::StatesMean,
            Query::StateMean { .. } => QueryKind::StateMean,
            Query::Best5 { .. } => QueryKind::Best5,
            Query::Worst5 { .. } => QueryKind::Worst5,
            Query::GlobalMean { .. } => QueryKind::GlobalMean,
            Query::DiffFromMean { .. } => QueryKind::DiffFromMean,
            Query::StateDiffFromMean { .. } => QueryKind::StateDiffFromMean,
            Query::MeanByCategory { .. } => QueryKind::MeanByCategory,
            Query::StateMeanByCategory { .. } => QueryKind::StateMeanByCategory,
        }
    }

    pub fn question(&self) -> &str {
        match self {
            Query::StatesMean { question }
            | Query::StateMean { question, .. }
            | Query::Best5 { question }
            | Query::Worst5 { question }
            | Query::GlobalMean { question }
            | Query::DiffFromMean { question }
            | Query::StateDiffFromMean { question, .. }
            | Query::MeanByCategory { question }
            | Query::StateMeanByCategory { question, .. } => question,
        }
    }
}

/// What a worker is asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobTask {
    Query(Query),
    /// Stops the worker that receives it and signals the rest of the pool.
    Shutdown,
}

/// A unit of work travelling through the job queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub task: JobTask,
}

impl Job {
    pub fn query(id: JobId, query: Query) -> Self {
        Self {
            id,
            task: JobTask::Query(query),
        }
    }

    pub fn shutdown() -> Self {
        Self {
            id: JobId::SENTINEL,
            task: JobTask::Shutdown,
        }
    }
}
