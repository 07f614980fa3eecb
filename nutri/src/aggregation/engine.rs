use std::collections::HashMap;
use std::sync::Arc;

use crate::aggregation::result::{QueryResult, category_key, state_category_key};
use crate::dataset::{Dataset, RankingDirection, Record};
use crate::jobs::Query;

/// Number of states reported by the best/worst rankings.
const RANKING_SIZE: usize = 5;

/// Key of the single entry produced by the global mean operation.
const GLOBAL_MEAN_KEY: &str = "global_mean";

/// Running sum and count of values, averaged to 0.0 when nothing was added.
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

impl<'a> FromIterator<&'a Record> for Mean {
    fn from_iter<T: IntoIterator<Item = &'a Record>>(iter: T) -> Self {
        let mut mean = Mean::default();
        for record in iter {
            mean.add(record.value);
        }
        mean
    }
}

/// Per-key means that remember the order in which keys were first seen.
#[derive(Debug, Default)]
struct GroupedMeans {
    groups: Vec<(String, Mean)>,
    index: HashMap<String, usize>,
}

impl GroupedMeans {
    fn add(&mut self, key: String, value: f64) {
        let position = match self.index.get(&key) {
            Some(position) => *position,
            None => {
                let position = self.groups.len();
                self.index.insert(key.clone(), position);
                self.groups.push((key, Mean::default()));
                position
            }
        };

        self.groups[position].1.add(value);
    }

    /// Returns the means in first-seen order.
    fn into_means(self) -> Vec<(String, f64)> {
        self.groups
            .into_iter()
            .map(|(key, mean)| (key, mean.value()))
            .collect()
    }
}

/// Sorts entries by ascending value. The sort is stable, so ties keep their current order.
fn sort_by_value(entries: &mut [(String, f64)]) {
    entries.sort_by(|a, b| a.1.total_cmp(&b.1));
}

/// Executes analytical queries against a shared dataset.
#[derive(Debug, Clone)]
pub struct Aggregator {
    dataset: Arc<Dataset>,
}

impl Aggregator {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Runs `query` and returns its result.
    pub fn run(&self, query: &Query) -> QueryResult {
        match query {
            Query::StatesMean { question } => QueryResult::Means(self.states_mean(question)),
            Query::StateMean { question, state } => {
                QueryResult::Means(vec![(state.clone(), self.state_mean(question, state))])
            }
            Query::Best5 { question } => QueryResult::Means(self.best5(question)),
            Query::Worst5 { question } => QueryResult::Means(self.worst5(question)),
            Query::GlobalMean { question } => QueryResult::Means(vec![(
                GLOBAL_MEAN_KEY.to_owned(),
                self.global_mean(question),
            )]),
            Query::DiffFromMean { question } => QueryResult::Means(self.diff_from_mean(question)),
            Query::StateDiffFromMean { question, state } => QueryResult::Means(vec![(
                state.clone(),
                self.state_diff_from_mean(question, state),
            )]),
            Query::MeanByCategory { question } => {
                QueryResult::Means(self.mean_by_category(question))
            }
            Query::StateMeanByCategory { question, state } => QueryResult::Nested {
                key: state.clone(),
                entries: self.state_mean_by_category(question, state),
            },
        }
    }

    /// Returns the mean of every state answering `question`, in ascending order of the mean.
    pub fn states_mean(&self, question: &str) -> Vec<(String, f64)> {
        let mut groups = GroupedMeans::default();
        for record in self.dataset.matching(question) {
            groups.add(record.location.clone(), record.value);
        }

        let mut means = groups.into_means();
        sort_by_value(&mut means);

        means
    }

    /// Returns the mean value of `question` in `state`, 0.0 when there is no matching record.
    pub fn state_mean(&self, question: &str, state: &str) -> f64 {
        self.dataset
            .matching_state(question, state)
            .collect::<Mean>()
            .value()
    }

    /// Returns the mean value of `question` over all records answering it.
    pub fn global_mean(&self, question: &str) -> f64 {
        self.dataset.matching(question).collect::<Mean>().value()
    }

    /// Returns the best performing states for `question`, in ascending order of the mean.
    pub fn best5(&self, question: &str) -> Vec<(String, f64)> {
        let lowest_first = self.dataset.direction(question) == RankingDirection::LowerIsBetter;
        self.ranking(question, lowest_first)
    }

    /// Returns the worst performing states for `question`, in ascending order of the mean.
    pub fn worst5(&self, question: &str) -> Vec<(String, f64)> {
        let lowest_first = self.dataset.direction(question) == RankingDirection::HigherIsBetter;
        self.ranking(question, lowest_first)
    }

    /// Returns `global_mean - state_mean` for every state, ordered by ascending state mean.
    pub fn diff_from_mean(&self, question: &str) -> Vec<(String, f64)> {
        let global_mean = self.global_mean(question);

        self.states_mean(question)
            .into_iter()
            .map(|(state, mean)| (state, global_mean - mean))
            .collect()
    }

    /// Returns `global_mean - state_mean` for `state`.
    pub fn state_diff_from_mean(&self, question: &str, state: &str) -> f64 {
        self.global_mean(question) - self.state_mean(question, state)
    }

    /// Returns the mean per `(location, category, stratification)` triple, in first-seen order.
    ///
    /// Records with an empty location, category or stratification are skipped.
    pub fn mean_by_category(&self, question: &str) -> Vec<(String, f64)> {
        let mut groups = GroupedMeans::default();
        for record in self.dataset.matching(question) {
            if record.has_empty_category_fields() {
                continue;
            }

            let key = category_key(
                &record.location,
                &record.stratification_category,
                &record.stratification,
            );
            groups.add(key, record.value);
        }

        groups.into_means()
    }

    /// Returns the mean per `(category, stratification)` pair of `state`, sorted by key.
    pub fn state_mean_by_category(&self, question: &str, state: &str) -> Vec<(String, f64)> {
        let mut groups = GroupedMeans::default();
        for record in self.dataset.matching_state(question, state) {
            let key = state_category_key(&record.stratification_category, &record.stratification);
            groups.add(key, record.value);
        }

        let mut means = groups.into_means();
        means.sort_by(|a, b| a.0.cmp(&b.0));

        means
    }

    /// Takes the lowest or highest [`RANKING_SIZE`] state means, keeping ascending order.
    fn ranking(&self, question: &str, lowest: bool) -> Vec<(String, f64)> {
        let mut means = self.states_mean(question);

        if lowest {
            means.truncate(RANKING_SIZE);
            means
        } else {
            let start = means.len().saturating_sub(RANKING_SIZE);
            means.split_off(start)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBESITY: &str = "Percent of adults aged 18 years and older who have obesity";
    const MUSCLE: &str =
        "Percent of adults who engage in muscle-strengthening activities on 2 or more days a week";

    fn record(location: &str, question: &str, value: f64, category: &str, strat: &str) -> Record {
        Record {
            location: location.to_owned(),
            year_start: 2011,
            year_end: 2011,
            question: question.to_owned(),
            value,
            stratification_category: category.to_owned(),
            stratification: strat.to_owned(),
        }
    }

    fn ranking_dataset(question: &str) -> Aggregator {
        let states = [
            ("Alabama", 30.0),
            ("Alaska", 10.0),
            ("Arizona", 70.0),
            ("Arkansas", 20.0),
            ("California", 60.0),
            ("Colorado", 40.0),
            ("Connecticut", 50.0),
        ];
        let records = states
            .iter()
            .map(|(state, value)| record(state, question, *value, "Total", "Total"))
            .collect();

        Aggregator::new(Arc::new(Dataset::new(records)))
    }

    fn states(entries: &[(String, f64)]) -> Vec<&str> {
        entries.iter().map(|(state, _)| state.as_str()).collect()
    }

    #[test]
    fn test_state_mean_without_match_is_zero() {
        let aggregator = ranking_dataset(OBESITY);

        assert_eq!(aggregator.state_mean(OBESITY, "Nowhere"), 0.0);
        assert_eq!(aggregator.state_mean("unknown question", "Alabama"), 0.0);
        assert_eq!(aggregator.global_mean("unknown question"), 0.0);
        assert!(aggregator.states_mean("unknown question").is_empty());
    }

    #[test]
    fn test_states_mean_sorted_ascending_with_stable_ties() {
        let aggregator = Aggregator::new(Arc::new(Dataset::new(vec![
            record("Ohio", OBESITY, 20.0, "Total", "Total"),
            record("Iowa", OBESITY, 20.0, "Total", "Total"),
            record("Maine", OBESITY, 10.0, "Total", "Total"),
            record("Iowa", OBESITY, 20.0, "Total", "Total"),
        ])));

        let means = aggregator.states_mean(OBESITY);

        assert_eq!(states(&means), vec!["Maine", "Iowa", "Ohio"]);
    }

    #[test]
    fn test_best5_and_worst5_follow_question_direction() {
        let aggregator = ranking_dataset(OBESITY);
        assert_eq!(
            states(&aggregator.best5(OBESITY)),
            vec!["Alaska", "Arkansas", "Alabama", "Colorado", "Connecticut"]
        );
        assert_eq!(
            states(&aggregator.worst5(OBESITY)),
            vec!["Alabama", "Colorado", "Connecticut", "California", "Arizona"]
        );

        let aggregator = ranking_dataset(MUSCLE);
        assert_eq!(
            states(&aggregator.best5(MUSCLE)),
            vec!["Alabama", "Colorado", "Connecticut", "California", "Arizona"]
        );
        assert_eq!(
            states(&aggregator.worst5(MUSCLE)),
            vec!["Alaska", "Arkansas", "Alabama", "Colorado", "Connecticut"]
        );
    }

    #[test]
    fn test_rankings_with_fewer_than_five_states() {
        let aggregator = Aggregator::new(Arc::new(Dataset::new(vec![
            record("Ohio", OBESITY, 20.0, "Total", "Total"),
            record("Iowa", OBESITY, 10.0, "Total", "Total"),
        ])));

        assert_eq!(states(&aggregator.best5(OBESITY)), vec!["Iowa", "Ohio"]);
        assert_eq!(states(&aggregator.worst5(OBESITY)), vec!["Iowa", "Ohio"]);
    }

    #[test]
    fn test_diff_from_mean_follows_state_mean_order() {
        let aggregator = ranking_dataset(OBESITY);
        let global_mean = aggregator.global_mean(OBESITY);
        assert_eq!(global_mean, 40.0);

        let diffs = aggregator.diff_from_mean(OBESITY);

        assert_eq!(diffs.first().unwrap(), &("Alaska".to_owned(), 30.0));
        assert_eq!(diffs.last().unwrap(), &("Arizona".to_owned(), -30.0));
        assert_eq!(
            aggregator.state_diff_from_mean(OBESITY, "Arizona"),
            global_mean - aggregator.state_mean(OBESITY, "Arizona")
        );
    }

    #[test]
    fn test_mean_by_category_skips_empty_fields() {
        let aggregator = Aggregator::new(Arc::new(Dataset::new(vec![
            record("Ohio", OBESITY, 20.0, "Sex", "Male"),
            record("Ohio", OBESITY, 30.0, "Sex", "Male"),
            record("Ohio", OBESITY, 99.0, "", ""),
            record("Ohio", OBESITY, 98.0, "Sex", ""),
            record("Ohio", OBESITY, 97.0, "", "Male"),
            record("", OBESITY, 96.0, "Sex", "Male"),
            record("Iowa", OBESITY, 10.0, "Sex", "Female"),
        ])));

        let means = aggregator.mean_by_category(OBESITY);

        assert_eq!(
            means,
            vec![
                ("('Iowa', 'Sex', 'Female')".to_owned(), 10.0),
                ("('Ohio', 'Sex', 'Male')".to_owned(), 25.0),
            ]
        );
    }

    #[test]
    fn test_state_mean_by_category_is_sorted_by_key() {
        let aggregator = Aggregator::new(Arc::new(Dataset::new(vec![
            record("Utah", OBESITY, 34.5, "Race/Ethnicity", "Other"),
            record("Utah", OBESITY, 38.9, "Race/Ethnicity", "Hispanic"),
            record("Ohio", OBESITY, 50.0, "Race/Ethnicity", "Hispanic"),
        ])));

        let result = aggregator.run(&Query::StateMeanByCategory {
            question: OBESITY.to_owned(),
            state: "Utah".to_owned(),
        });

        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"Utah":{"('Race/Ethnicity', 'Hispanic')":38.9,"('Race/Ethnicity', 'Other')":34.5}}"#
        );
    }

    #[test]
    fn test_same_query_twice_is_identical() {
        let aggregator = ranking_dataset(OBESITY);
        let query = Query::DiffFromMean {
            question: OBESITY.to_owned(),
        };

        let first = serde_json::to_string(&aggregator.run(&query)).unwrap();
        let second = serde_json::to_string(&aggregator.run(&query)).unwrap();

        assert_eq!(first, second);
    }
}
