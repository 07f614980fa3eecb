//! Loading of the survey CSV export into a [`Dataset`].

use std::io;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use crate::bail;
use crate::dataset::{Dataset, Record};
use crate::error::{ErrorKind, NutriResult};
use crate::nutri_error;

const YEAR_START_COLUMN: usize = 1;
const YEAR_END_COLUMN: usize = 2;
const LOCATION_COLUMN: usize = 4;
const QUESTION_COLUMN: usize = 8;
const VALUE_COLUMN: usize = 11;
/// Offsets counted from the end of the row, the export has a variable number of trailing
/// identifier columns before these.
const STRATIFICATION_CATEGORY_OFFSET_FROM_END: usize = 4;
const STRATIFICATION_OFFSET_FROM_END: usize = 3;

impl Dataset {
    /// Loads the dataset from the CSV export at `path`.
    ///
    /// The first row is treated as a header. Any malformed row fails the whole load, since a
    /// partially loaded dataset would silently skew every mean computed afterward.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> NutriResult<Dataset> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading dataset");

        let file = std::fs::File::open(path).map_err(|err| {
            nutri_error!(
                ErrorKind::DatasetLoadFailed,
                "Dataset file could not be opened",
                path.display(),
                source: err
            )
        })?;

        let dataset = Dataset::from_csv_reader(file)?;

        info!(records = dataset.len(), "dataset loaded");

        Ok(dataset)
    }

    /// Loads the dataset from any CSV source with a header row.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> NutriResult<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(parse_row(&row)?);
        }

        debug!(records = records.len(), "parsed dataset rows");

        Ok(Dataset::new(records))
    }
}

/// Converts a CSV row into a [`Record`].
fn parse_row(row: &StringRecord) -> NutriResult<Record> {
    let line = row.position().map(|position| position.line()).unwrap_or(0);

    let minimum_len = (VALUE_COLUMN + 1).max(STRATIFICATION_CATEGORY_OFFSET_FROM_END);
    if row.len() < minimum_len {
        bail!(
            ErrorKind::InvalidRecord,
            "Dataset row has too few columns",
            format!("line {line}: expected at least {minimum_len} columns, found {}", row.len())
        );
    }

    let field = |index: usize| row.get(index).unwrap_or_default();

    Ok(Record {
        location: field(LOCATION_COLUMN).to_owned(),
        year_start: parse_field(field(YEAR_START_COLUMN), "YearStart", line)?,
        year_end: parse_field(field(YEAR_END_COLUMN), "YearEnd", line)?,
        question: field(QUESTION_COLUMN).to_owned(),
        value: parse_field(field(VALUE_COLUMN), "Data_Value", line)?,
        stratification_category: field(row.len() - STRATIFICATION_CATEGORY_OFFSET_FROM_END)
            .to_owned(),
        stratification: field(row.len() - STRATIFICATION_OFFSET_FROM_END).to_owned(),
    })
}

/// Parses a numeric column, reporting the column name and line on failure.
fn parse_field<T>(raw: &str, column: &str, line: u64) -> NutriResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|err| {
        nutri_error!(
            ErrorKind::InvalidRecord,
            "Dataset row has an invalid numeric value",
            format!("line {line}: column {column} = {raw:?}: {err}")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "YearStart,YearStart,YearEnd,LocationAbbr,LocationDesc,Datasource,Class,Topic,Question,Data_Value_Unit,Data_Value_Type,Data_Value,StratificationCategory1,Stratification1,GeoLocation,LocationID";

    fn csv(rows: &[&str]) -> String {
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content
    }

    #[test]
    fn test_parses_columns_and_sorts_by_location() {
        let content = csv(&[
            r#"2011,2011,2011,UT,Utah,BRFSS,Obesity,Obesity,"Percent of adults, quoted",,Value,38.9,Race/Ethnicity,Hispanic,"(39.3, -111.6)",49"#,
            r#"2012,2012,2013,AL,Alabama,BRFSS,Obesity,Obesity,"Percent of adults, quoted",,Value,31.5,Sex,Male,"(32.8, -86.6)",01"#,
        ]);

        let dataset = Dataset::from_csv_reader(content.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 2);
        let first = &dataset.records()[0];
        assert_eq!(first.location, "Alabama");
        assert_eq!(first.year_start, 2012);
        assert_eq!(first.year_end, 2013);
        assert_eq!(first.question, "Percent of adults, quoted");
        assert_eq!(first.value, 31.5);
        assert_eq!(first.stratification_category, "Sex");
        assert_eq!(first.stratification, "Male");
        assert_eq!(dataset.records()[1].location, "Utah");
    }

    #[test]
    fn test_invalid_value_reports_line() {
        let content = csv(&[
            r#"2011,2011,2011,UT,Utah,BRFSS,Obesity,Obesity,Q,,Value,not-a-number,Race/Ethnicity,Hispanic,"(39.3, -111.6)",49"#,
        ]);

        let err = Dataset::from_csv_reader(content.as_bytes()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidRecord);
        assert!(err.detail().unwrap().contains("line 2"));
        assert!(err.detail().unwrap().contains("Data_Value"));
    }

    #[test]
    fn test_short_row_is_rejected() {
        let content = csv(&["2011,2011,2011,UT,Utah"]);

        let err = Dataset::from_csv_reader(content.as_bytes()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidRecord);
    }

    #[test]
    fn test_missing_file_is_dataset_load_failure() {
        let err = Dataset::load_csv("/definitely/not/here.csv").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DatasetLoadFailed);
    }
}
