//! Province-specific cleanup of raw API rows.
//!
//! The pipeline runs in a fixed order: ordering fix, counterpart placeholder
//! fix, unit correction, numeric formatting. It never fails; fields that are
//! missing or do not parse are passed through unchanged.

use crate::{
    observation::{columns, Dataset, Row},
    province::Province,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use hfed_utils::numbers::format_grouped;
use log::debug;

/// Sentinel the API uses for "not applicable" counterpart areas.
pub const COUNTERPART_SENTINEL: &str = "_Z";

/// Replacement shown for the sentinel.
pub const COUNTERPART_NOT_APPLICABLE: &str = "N/A";

/// Provinces whose API returns rows out of chronological order.
pub const UNORDERED_PROVINCES: &[Province] = &[Province::Saskatchewan];

/// A unit token the API reports wrongly for a province (and optionally a
/// single variable).
#[derive(Debug, Clone, Copy)]
pub struct UnitCorrection {
    pub province: Province,
    /// `None` applies to every variable of the province.
    pub variable: Option<&'static str>,
    pub from: &'static str,
    pub to: &'static str,
}

impl UnitCorrection {
    fn applies_to(&self, province: Province, variable: &str) -> bool {
        self.province == province && self.variable.map_or(true, |v| v == variable)
    }
}

pub static UNIT_CORRECTIONS: &[UnitCorrection] = &[
    // a percentage labelled as megawatts
    UnitCorrection {
        province: Province::PrinceEdwardIsland,
        variable: Some("WIND_PERCENT"),
        from: "MW",
        to: "%",
    },
    // energy labelled as power
    UnitCorrection {
        province: Province::NewBrunswick,
        variable: None,
        from: "MW",
        to: "MWh",
    },
];

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an API timestamp into an instant. Offsets are honoured when
/// present; naive timestamps are read as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Timestamp of a row: local time when present, UTC period otherwise.
pub fn row_timestamp(row: &Row) -> Option<&str> {
    [columns::DATETIME_LOCAL, columns::TIME_PERIOD]
        .iter()
        .filter_map(|column| row.get(*column))
        .map(String::as_str)
        .find(|v| !v.is_empty())
}

/// Stable ascending sort by row timestamp. Rows without a parseable
/// timestamp keep their relative order after all dated rows.
pub fn sort_chronologically(rows: &mut [Row]) {
    rows.sort_by_cached_key(|row| {
        let ts = row_timestamp(row).and_then(parse_timestamp);
        (ts.is_none(), ts)
    });
}

/// Replace the "_Z" sentinel with "N/A" and make sure the column exists.
pub fn fix_counterpart(row: &mut Row) {
    let value = row
        .entry(columns::COUNTERPART_AREA.to_string())
        .or_default();
    if *value == COUNTERPART_SENTINEL {
        *value = COUNTERPART_NOT_APPLICABLE.to_string();
    }
}

/// Rewrite mislabelled unit tokens. Applying it twice is the same as once.
pub fn correct_units(province: Province, variable: &str, row: &mut Row) {
    let Some(unit) = row.get_mut(columns::UNIT_MEASURE) else {
        return;
    };
    for correction in UNIT_CORRECTIONS
        .iter()
        .filter(|c| c.applies_to(province, variable))
    {
        if *unit == correction.from {
            *unit = correction.to.to_string();
        }
    }
}

/// Group the digits of a numeric OBS_VALUE; anything else stays as is.
pub fn format_obs_value(row: &mut Row) {
    if let Some(value) = row.get_mut(columns::OBS_VALUE) {
        if let Some(grouped) = format_grouped(value) {
            *value = grouped;
        }
    }
}

/// Run the full pipeline over a parsed response.
pub fn normalize(province: Province, variable: &str, mut dataset: Dataset) -> Dataset {
    if UNORDERED_PROVINCES.contains(&province) {
        debug!("Sorting {} rows for {}", dataset.len(), province);
        sort_chronologically(&mut dataset.rows);
    }
    for row in dataset.rows.iter_mut() {
        fix_counterpart(row);
        correct_units(province, variable, row);
        format_obs_value(row);
    }
    if !dataset.is_empty() {
        dataset.ensure_column(columns::COUNTERPART_AREA);
    }
    dataset
}
