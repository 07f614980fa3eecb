//! The read-only survey dataset every query runs against.
//!
//! A [`Dataset`] is built once at startup, either from parsed records or from the CSV export
//! (see [`loader`]), and is shared between workers behind an [`std::sync::Arc`] without any
//! locking. Records are kept stably sorted by location, which is the order every "first
//! encountered" policy of the aggregation engine refers to.

use std::collections::HashSet;

mod loader;
pub mod questions;
mod record;

pub use questions::RankingDirection;
pub use record::Record;

/// Immutable, location-sorted collection of survey records.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    lower_is_better: HashSet<String>,
}

impl Dataset {
    /// Creates a dataset from `records` using the built-in question classification.
    ///
    /// Records are stably sorted by location, so rows of the same state keep their relative
    /// order.
    pub fn new(mut records: Vec<Record>) -> Self {
        // `sort_by` is stable, which the ordering policies of the aggregation engine rely on.
        records.sort_by(|a, b| a.location.cmp(&b.location));

        Self {
            records,
            lower_is_better: questions::LOWER_IS_BETTER
                .iter()
                .map(|question| question.to_string())
                .collect(),
        }
    }

    /// Returns all records in location order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the records answering `question`, in location order.
    pub fn matching<'a>(&'a self, question: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |record| record.answers(question))
    }

    /// Returns the records answering `question` for `state`, in dataset order.
    pub fn matching_state<'a>(
        &'a self,
        question: &'a str,
        state: &'a str,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        self.records
            .iter()
            .filter(move |record| record.answers_for(question, state))
    }

    /// Returns the ranking direction of `question`.
    ///
    /// Any question that is not classified as lower-is-better is ranked higher-is-better,
    /// including questions the dataset has never seen.
    pub fn direction(&self, question: &str) -> RankingDirection {
        if self.lower_is_better.contains(question) {
            RankingDirection::LowerIsBetter
        } else {
            RankingDirection::HigherIsBetter
        }
    }
}
