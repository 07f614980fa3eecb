use serde::{Deserialize, Serialize};

/// One row of the survey dataset.
///
/// Records are immutable once loaded. `location` is the state (or territory) name the row
/// belongs to, and the stratification pair describes the population slice the value was
/// measured on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub location: String,
    pub year_start: i32,
    pub year_end: i32,
    pub question: String,
    pub value: f64,
    pub stratification_category: String,
    pub stratification: String,
}

impl Record {
    /// Returns `true` when the record answers `question`.
    pub fn answers(&self, question: &str) -> bool {
        self.question == question
    }

    /// Returns `true` when the record answers `question` for `state`.
    pub fn answers_for(&self, question: &str, state: &str) -> bool {
        self.question == question && self.location == state
    }

    /// Returns `true` if any of the fields used to build category keys is empty.
    pub fn has_empty_category_fields(&self) -> bool {
        self.location.is_empty()
            || self.stratification_category.is_empty()
            || self.stratification.is_empty()
    }
}
