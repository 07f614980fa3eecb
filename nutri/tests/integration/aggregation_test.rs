use nutri::aggregation::{Aggregator, QueryResult};
use nutri::dataset::Dataset;
use nutri::jobs::{Query, QueryKind, QueryParams};
use nutri::test_utils::dataset::{
    MUSCLE_QUESTION, OBESITY_QUESTION, RecordBuilder, sample_dataset, utah_records, write_csv,
};
use nutri_telemetry::tracing::init_test_tracing;

fn query(kind: QueryKind, question: &str, state: Option<&str>) -> Query {
    Query::new(
        kind,
        QueryParams {
            question: question.to_owned(),
            state: state.map(str::to_owned),
        },
    )
    .unwrap()
}

#[test]
fn utah_mean_by_category_matches_expected_output() {
    init_test_tracing();
    let aggregator = Aggregator::new(sample_dataset());

    let result = aggregator.run(&query(
        QueryKind::StateMeanByCategory,
        OBESITY_QUESTION,
        Some("Utah"),
    ));

    assert_eq!(
        serde_json::to_string(&result).unwrap(),
        r#"{"Utah":{"('Race/Ethnicity', 'Hispanic')":38.9,"('Race/Ethnicity', 'Other')":34.5}}"#
    );
}

#[test]
fn loaded_csv_answers_like_in_memory_dataset() {
    init_test_tracing();
    let dir = tempfile::tempdir().unwrap();
    let mut records = utah_records();
    records.push(
        RecordBuilder::new("Ohio", OBESITY_QUESTION, 31.0)
            .stratification("Sex", "Male")
            .build(),
    );
    let path = write_csv(dir.path(), &records);

    let loaded = Aggregator::new(std::sync::Arc::new(Dataset::load_csv(&path).unwrap()));
    let in_memory = Aggregator::new(std::sync::Arc::new(Dataset::new(records)));

    for kind in QueryKind::ALL {
        let query = query(kind, OBESITY_QUESTION, Some("Utah"));
        assert_eq!(loaded.run(&query), in_memory.run(&query), "{kind}");
    }
}

#[test]
fn state_diff_from_mean_is_global_minus_state_mean() {
    init_test_tracing();
    let aggregator = Aggregator::new(sample_dataset());

    for state in ["Alabama", "Utah", "Nowhere"] {
        assert_eq!(
            aggregator.state_diff_from_mean(OBESITY_QUESTION, state),
            aggregator.global_mean(OBESITY_QUESTION)
                - aggregator.state_mean(OBESITY_QUESTION, state)
        );
    }
}

#[test]
fn rankings_depend_on_question_direction() {
    init_test_tracing();
    let aggregator = Aggregator::new(sample_dataset());

    let states = |result: QueryResult| -> Vec<String> {
        result
            .means()
            .unwrap()
            .iter()
            .map(|(state, _)| state.clone())
            .collect()
    };

    let best_obesity = states(aggregator.run(&query(QueryKind::Best5, OBESITY_QUESTION, None)));
    assert_eq!(best_obesity[0], "Alaska");
    assert_eq!(best_obesity.len(), 5);

    // Higher is better, so the best states are the last five of the ascending ranking.
    let best_muscle = states(aggregator.run(&query(QueryKind::Best5, MUSCLE_QUESTION, None)));
    assert_eq!(best_muscle.last().unwrap(), "Alaska");

    let worst_muscle = states(aggregator.run(&query(QueryKind::Worst5, MUSCLE_QUESTION, None)));
    assert_eq!(worst_muscle.first().unwrap(), "Arizona");
}

#[test]
fn unknown_question_yields_empty_or_zero_results() {
    init_test_tracing();
    let aggregator = Aggregator::new(sample_dataset());

    assert_eq!(
        aggregator.run(&query(QueryKind::StatesMean, "unknown", None)),
        QueryResult::Means(vec![])
    );
    assert_eq!(
        aggregator.run(&query(QueryKind::GlobalMean, "unknown", None)),
        QueryResult::Means(vec![("global_mean".to_owned(), 0.0)])
    );
    assert_eq!(
        aggregator.run(&query(QueryKind::StateMean, "unknown", Some("Utah"))),
        QueryResult::Means(vec![("Utah".to_owned(), 0.0)])
    );
}
