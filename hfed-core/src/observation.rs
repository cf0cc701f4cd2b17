use csv::{ReaderBuilder, Trim};
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;

/// One observation: column name to raw text value.
pub type Row = BTreeMap<String, String>;

/// Column names observed in HFED CSV responses. Not every column is present
/// for every province/variable combination.
pub mod columns {
    pub const DATAFLOW: &str = "DATAFLOW";
    pub const REF_AREA: &str = "REF_AREA";
    pub const REFERENCE_AREA: &str = "REFERENCE_AREA";
    pub const COUNTERPART_AREA: &str = "COUNTERPART_AREA";
    pub const ENERGY_FLOWS: &str = "ENERGY_FLOWS";
    pub const TIME_PERIOD: &str = "TIME_PERIOD";
    pub const OBS_VALUE: &str = "OBS_VALUE";
    pub const DATETIME_LOCAL: &str = "DATETIME_LOCAL";
    pub const UNIT_MEASURE: &str = "UNIT_MEASURE";
    pub const GENERATOR: &str = "GENERATOR";
}

/// Ordered columns plus the rows parsed against them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Parse a CSV response body. The first line is the header; each record is
    /// matched positionally against it and missing trailing fields become "".
    ///
    /// Malformed records are skipped with a warning rather than failing the
    /// whole response.
    pub fn parse_csv(body: &str) -> Dataset {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(body.trim().as_bytes());

        let columns: Vec<String> = match rdr.headers() {
            Ok(headers) => headers.iter().map(str::to_string).collect(),
            Err(e) => {
                warn!("Failed to read CSV header: {}", e);
                return Dataset::default();
            }
        };
        if columns.iter().all(String::is_empty) {
            return Dataset::default();
        }

        let mut rows = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    warn!("Skipping malformed CSV record {}: {}", line + 1, e);
                    continue;
                }
            };
            let row: Row = columns
                .iter()
                .enumerate()
                .map(|(i, column)| (column.clone(), record.get(i).unwrap_or("").to_string()))
                .collect();
            rows.push(row);
        }
        Dataset { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Append `column` to the column list if it is not already there.
    pub fn ensure_column(&mut self, column: &str) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
    }

    /// Copy of this dataset keeping only rows for the given secondary-filter
    /// value; `None` keeps every row.
    pub fn filtered(&self, value: Option<&str>) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: crate::secondary_filter::filter_rows(&self.rows, value),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{columns, Dataset};

    // https://api.statcan.gc.ca/hfed-dehf/sdmx/rest/data/CCEI,DF_HFED_NB,1.0/N...NSI?startPeriod=2024-10-01&endPeriod=2024-10-01&dimensionAtObservation=AllDimensions&format=csv
    const STR_RESULT: &str = r#"DATAFLOW,FREQ,REF_AREA,COUNTERPART_AREA,ENERGY_FLOWS,TIME_PERIOD,OBS_VALUE,DATETIME_LOCAL,UNIT_MEASURE
CCEI:DF_HFED_NB(1.0),N,CA_NB,CA_QC,NSI,2024-10-01T04:00:00,-312,2024-10-01T01:00:00,MW
CCEI:DF_HFED_NB(1.0),N,CA_NB,US_NE,NSI,2024-10-01T04:00:00,1240.5,2024-10-01T01:00:00,MW
CCEI:DF_HFED_NB(1.0),N,CA_NB,CA_NS,NSI,2024-10-01T04:00:00,,2024-10-01T01:00:00,MW
"#;

    #[test]
    fn test_parse_csv() {
        let dataset = Dataset::parse_csv(STR_RESULT);
        assert_eq!(dataset.columns.len(), 9);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.rows[1][columns::OBS_VALUE], "1240.5");
        assert_eq!(dataset.rows[2][columns::OBS_VALUE], "");
        assert_eq!(dataset.rows[0][columns::COUNTERPART_AREA], "CA_QC");
    }

    #[test]
    fn test_missing_trailing_fields_default_to_empty() {
        let dataset = Dataset::parse_csv("A,B,C\n1,2\n4,5,6\n");
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows[0]["C"], "");
        assert_eq!(dataset.rows[1]["C"], "6");
    }

    #[test]
    fn test_quoted_fields_and_crlf() {
        let dataset = Dataset::parse_csv("A,B\r\n\"x, y\",2\r\n");
        assert_eq!(dataset.rows[0]["A"], "x, y");
        assert_eq!(dataset.rows[0]["B"], "2");
    }

    #[test]
    fn test_empty_body() {
        assert!(Dataset::parse_csv("").is_empty());
        assert!(Dataset::parse_csv("\n\n").columns.is_empty());
        let header_only = Dataset::parse_csv("A,B\n");
        assert!(header_only.is_empty());
        assert_eq!(header_only.columns, vec!["A", "B"]);
    }

    #[test]
    fn test_filtered() {
        let dataset = Dataset::parse_csv(STR_RESULT);
        let us = dataset.filtered(Some("US_NE"));
        assert_eq!(us.len(), 1);
        assert_eq!(us.columns, dataset.columns);
        // REF_AREA is not one of the matched dimension columns
        assert!(dataset.filtered(Some("CA_NB")).is_empty());
        assert_eq!(dataset.filtered(None), dataset);
    }

    #[test]
    fn test_ensure_column() {
        let mut dataset = Dataset::parse_csv("A\n1\n");
        dataset.ensure_column("B");
        dataset.ensure_column("A");
        assert_eq!(dataset.columns, vec!["A", "B"]);
    }
}
