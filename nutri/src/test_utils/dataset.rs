//! Dataset fixtures.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::dataset::{Dataset, Record};

/// Question classified as lower-is-better.
pub const OBESITY_QUESTION: &str = "Percent of adults aged 18 years and older who have obesity";

/// Question classified as higher-is-better.
pub const MUSCLE_QUESTION: &str =
    "Percent of adults who engage in muscle-strengthening activities on 2 or more days a week";

/// Builder for [`Record`]s with sensible defaults.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    pub fn new(location: &str, question: &str, value: f64) -> Self {
        Self {
            record: Record {
                location: location.to_owned(),
                year_start: 2011,
                year_end: 2011,
                question: question.to_owned(),
                value,
                stratification_category: "Total".to_owned(),
                stratification: "Total".to_owned(),
            },
        }
    }

    pub fn years(mut self, year_start: i32, year_end: i32) -> Self {
        self.record.year_start = year_start;
        self.record.year_end = year_end;
        self
    }

    pub fn stratification(mut self, category: &str, stratification: &str) -> Self {
        self.record.stratification_category = category.to_owned();
        self.record.stratification = stratification.to_owned();
        self
    }

    pub fn build(self) -> Record {
        self.record
    }
}

/// Shorthand for a record with the default stratification.
pub fn record(location: &str, question: &str, value: f64) -> Record {
    RecordBuilder::new(location, question, value).build()
}

/// Returns a dataset covering two questions over seven states, with a category breakdown for
/// Utah.
pub fn sample_dataset() -> Arc<Dataset> {
    let mut records = Vec::new();

    for (state, value) in [
        ("Alabama", 30.0),
        ("Alaska", 10.0),
        ("Arizona", 70.0),
        ("Arkansas", 20.0),
        ("California", 60.0),
        ("Colorado", 40.0),
        ("Connecticut", 50.0),
    ] {
        records.push(record(state, OBESITY_QUESTION, value));
        records.push(record(state, MUSCLE_QUESTION, 100.0 - value));
    }

    records.extend(utah_records());

    Arc::new(Dataset::new(records))
}

/// Returns the Utah records whose category breakdown is
/// `{"('Race/Ethnicity', 'Hispanic')": 38.9, "('Race/Ethnicity', 'Other')": 34.5}`.
pub fn utah_records() -> Vec<Record> {
    vec![
        RecordBuilder::new("Utah", OBESITY_QUESTION, 34.5)
            .stratification("Race/Ethnicity", "Other")
            .build(),
        RecordBuilder::new("Utah", OBESITY_QUESTION, 38.9)
            .years(2012, 2012)
            .stratification("Race/Ethnicity", "Hispanic")
            .build(),
    ]
}

/// Writes `records` as a CSV export to `dir`, returning the file path.
///
/// The layout matches the export read by [`Dataset::load_csv`].
pub fn write_csv(dir: &Path, records: &[Record]) -> PathBuf {
    let path = dir.join("dataset.csv");
    let mut file = std::fs::File::create(&path).unwrap();

    writeln!(
        file,
        "YearStart,YearStart,YearEnd,LocationAbbr,LocationDesc,Datasource,Class,Topic,Question,\
         Data_Value_Unit,Data_Value_Type,Data_Value,StratificationCategory1,Stratification1,\
         GeoLocation,LocationID"
    )
    .unwrap();

    for record in records {
        writeln!(
            file,
            "{},{},{},XX,\"{}\",BRFSS,Class,Topic,\"{}\",,Value,{},\"{}\",\"{}\",\"(0.0, 0.0)\",00",
            record.year_start,
            record.year_start,
            record.year_end,
            record.location,
            record.question,
            record.value,
            record.stratification_category,
            record.stratification,
        )
        .unwrap();
    }

    path
}
