//! Fixed classification of survey questions by ranking direction.
//!
//! Only the lower-is-better questions are listed, every other question ranks its highest values
//! as best.

/// Questions for which a lower value is the better outcome.
pub const LOWER_IS_BETTER: &[&str] = &[
    "Percent of adults aged 18 years and older who have an overweight classification",
    "Percent of adults aged 18 years and older who have obesity",
    "Percent of adults who engage in no leisure-time physical activity",
    "Percent of adults who report consuming fruit less than one time daily",
    "Percent of adults who report consuming vegetables less than one time daily",
];

/// Which extreme of the value range counts as "best" for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingDirection {
    LowerIsBetter,
    HigherIsBetter,
}
