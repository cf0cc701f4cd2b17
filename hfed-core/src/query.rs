//! SDMX query descriptors and the URLs derived from them.
//!
//! URL shape:
//! `{base}{dataflow},1.0/{frequency}...{variable}?startPeriod=..&endPeriod=..&dimensionAtObservation=AllDimensions&format=csv`

use crate::{catalog::QUEBEC_HOURLY_SOURCES, date_range::DateRange, province::Province};
use chrono::NaiveDate;
use hfed_utils::dates::format_date;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base endpoint of the CCEI SDMX REST API. The dataflow id is appended directly.
pub const DEFAULT_BASE_URL: &str = "https://api.statcan.gc.ca/hfed-dehf/sdmx/rest/data/CCEI,";

/// Dataflow version segment.
pub const DATAFLOW_VERSION: &str = "1.0";

/// Observation-dimension ordering flag sent with every request.
pub const DIMENSION_FLAG: &str = "dimensionAtObservation=AllDimensions";

/// Output-format flag; omitting it yields the XML representation.
pub const CSV_FORMAT_FLAG: &str = "format=csv";

/// Placeholder shown in the date-range example URL.
pub const DATE_PLACEHOLDER: &str = "YYYY-MM-DD";

/// Granularity flag required by the API.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Frequency {
    Hourly,
    Minutely,
}

impl Frequency {
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::Hourly => "H",
            Frequency::Minutely => "N",
        }
    }
}

/// Response representation selected by the format flag.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Format {
    Csv,
    Xml,
}

/// Frequency for a (province, variable) pair: hourly only for the Quebec
/// generation sources, sub-hourly everywhere else.
pub fn frequency_code(province: Province, variable: &str) -> Frequency {
    if province == Province::Quebec && QUEBEC_HOURLY_SOURCES.contains(&variable) {
        Frequency::Hourly
    } else {
        Frequency::Minutely
    }
}

/// A fully resolved request for one time series.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub dataflow: String,
    pub frequency: Frequency,
    pub variable: String,
    /// `None` requests the unrestricted historical series.
    pub range: Option<DateRange>,
}

/// Assemble the query for a selection. A date filter is only applied when
/// both bounds are supplied.
pub fn build_query(
    province: Province,
    variable: &str,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> QueryDescriptor {
    QueryDescriptor {
        dataflow: province.dataflow().to_string(),
        frequency: frequency_code(province, variable),
        variable: variable.to_string(),
        range: DateRange::from_bounds(start_date, end_date),
    }
}

impl QueryDescriptor {
    /// Path segment: `{dataflow},1.0/{frequency}...{variable}`
    pub fn path(&self) -> String {
        format!(
            "{},{}/{}...{}",
            self.dataflow,
            DATAFLOW_VERSION,
            self.frequency.code(),
            self.variable
        )
    }

    /// Query string without the leading `?`.
    pub fn query_string(&self, format: Format) -> String {
        let mut params: Vec<String> = Vec::with_capacity(4);
        if let Some(range) = &self.range {
            params.push(format!("startPeriod={}", format_date(&range.start())));
            params.push(format!("endPeriod={}", format_date(&range.end())));
        }
        params.push(DIMENSION_FLAG.to_string());
        if format == Format::Csv {
            params.push(CSV_FORMAT_FLAG.to_string());
        }
        params.join("&")
    }

    /// Full request URL against `base_url`.
    pub fn url(&self, base_url: &str, format: Format) -> String {
        format!("{}{}?{}", base_url, self.path(), self.query_string(format))
    }
}

/// Contents of the API-info view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiInfo {
    pub csv_url: String,
    pub xml_url: String,
    /// Date-filtered CSV URL with `YYYY-MM-DD` in place of the dates.
    pub example_url: String,
}

impl ApiInfo {
    pub fn new(base_url: &str, province: Province, variable: &str) -> Self {
        let full = build_query(province, variable, None, None);
        let example = format!(
            "{}{}?startPeriod={}&endPeriod={}&{}&{}",
            base_url,
            full.path(),
            DATE_PLACEHOLDER,
            DATE_PLACEHOLDER,
            DIMENSION_FLAG,
            CSV_FORMAT_FLAG
        );
        ApiInfo {
            csv_url: full.url(base_url, Format::Csv),
            xml_url: full.url(base_url, Format::Xml),
            example_url: example,
        }
    }
}

impl fmt::Display for ApiInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "To fetch the entire data series:")?;
        writeln!(f, "API URL (CSV format): {}", self.csv_url)?;
        writeln!(f, "API URL (XML format): {}", self.xml_url)?;
        writeln!(f)?;
        writeln!(f, "To reduce download time, select a custom date range:")?;
        writeln!(f, "Replace YYYY-MM-DD with preferred dates:")?;
        write!(f, "Example (CSV): {}", self.example_url)
    }
}
