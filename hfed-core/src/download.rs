//! CSV export of the currently displayed rows.

use crate::{
    observation::{columns, Dataset},
    province::Province,
};
use std::borrow::Cow;

/// Human labels for the columns shown in the table and the download header,
/// in display order.
pub const COLUMN_LABELS: &[(&str, &str)] = &[
    (columns::DATAFLOW, "Data flow"),
    (columns::REF_AREA, "Reference area"),
    (columns::COUNTERPART_AREA, "Counterpart area"),
    (columns::ENERGY_FLOWS, "Energy flow"),
    (columns::TIME_PERIOD, "Time period (UTC)"),
    (columns::OBS_VALUE, "Observation value"),
    (columns::DATETIME_LOCAL, "Time period (local)"),
    (columns::UNIT_MEASURE, "Unit measure"),
];

/// Label for a column key; unknown keys are shown as is.
pub fn column_label(key: &str) -> &str {
    COLUMN_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

/// Quote a field containing a delimiter, quote, line break or space,
/// doubling any embedded quotes.
pub fn quote_field(field: &str) -> Cow<'_, str> {
    let needs_quotes = field
        .chars()
        .any(|c| matches!(c, ',' | '"' | '\n' | '\r' | ' '));
    if needs_quotes {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Render a dataset as a CSV document with a labelled header row.
///
/// Returns `None` when there is nothing to download.
pub fn to_csv(dataset: &Dataset) -> Option<String> {
    if dataset.is_empty() {
        return None;
    }
    let mut out = String::new();
    let header: Vec<Cow<'_, str>> = dataset
        .columns
        .iter()
        .map(|key| quote_field(column_label(key)))
        .collect();
    out.push_str(&header.join(","));
    out.push('\n');
    for row in &dataset.rows {
        let fields: Vec<Cow<'_, str>> = dataset
            .columns
            .iter()
            .map(|key| quote_field(row.get(key).map(String::as_str).unwrap_or("")))
            .collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    Some(out)
}

/// Suggested file name for a download.
pub fn file_name(province: Province, variable: &str) -> String {
    format!("HFED_{}_{}_data.csv", province.name(), variable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_field() {
        assert_eq!(quote_field("CA_NB"), "CA_NB");
        assert_eq!(quote_field("1,234.5"), "\"1,234.5\"");
        assert_eq!(quote_field("Data flow"), "\"Data flow\"");
        assert_eq!(quote_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_field("a\nb"), "\"a\nb\"");
        assert_eq!(quote_field(""), "");
    }

    #[test]
    fn test_to_csv() {
        let mut dataset =
            Dataset::parse_csv("REF_AREA,OBS_VALUE,EXTRA\nCA_NB,5,x\nCA_NB,6\n");
        dataset.rows[0].insert("OBS_VALUE".to_string(), "1,000".to_string());
        let csv = to_csv(&dataset).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "\"Reference area\",\"Observation value\",EXTRA");
        assert_eq!(lines[1], "CA_NB,\"1,000\",x");
        assert_eq!(lines[2], "CA_NB,6,");
    }

    #[test]
    fn test_to_csv_empty() {
        assert_eq!(to_csv(&Dataset::default()), None);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name(Province::NovaScotia, "LOAD"),
            "HFED_Nova Scotia_LOAD_data.csv"
        );
    }

    #[test]
    fn test_column_label() {
        assert_eq!(column_label("TIME_PERIOD"), "Time period (UTC)");
        assert_eq!(column_label("GENERATOR"), "GENERATOR");
    }
}
