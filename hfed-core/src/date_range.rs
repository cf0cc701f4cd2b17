use chrono::NaiveDate;
use hfed_utils::dates::format_date;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive start/end date pair. Queries either carry a complete range
/// or none at all, so a half-open range cannot be represented.
#[derive(Clone, Eq, PartialEq, Hash, Copy, Debug, Serialize, Deserialize)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    /// Build a range only when both bounds are supplied.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<DateRange> {
        match (start, end) {
            (Some(start), Some(end)) => Some(DateRange(start, end)),
            _ => None,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.0
    }

    pub fn end(&self) -> NaiveDate {
        self.1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", format_date(&self.0), format_date(&self.1))
    }
}
