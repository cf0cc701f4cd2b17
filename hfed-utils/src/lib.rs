//! Shared utility functions for HFED crates.

/// Date utility functions
pub mod dates {
    use chrono::{Duration, Local, NaiveDate};

    /// Date format used for API query parameters and date inputs: "YYYY-MM-DD"
    pub const ISO_FORMAT: &str = "%Y-%m-%d";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(ISO_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), ISO_FORMAT)?)
    }

    /// Today's date in the local timezone.
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// The window of `days` days ending on `end` (inclusive of both ends).
    pub fn past_days(end: NaiveDate, days: i64) -> (NaiveDate, NaiveDate) {
        (end - Duration::days(days), end)
    }

}

/// en-CA number formatting for observation values
pub mod numbers {
    /// Thousands separator used by the en-CA locale.
    pub const GROUP_SEPARATOR: char = ',';

    /// Format a raw numeric string with en-CA digit grouping.
    ///
    /// Returns `None` when the input does not parse as a finite number, so the
    /// caller can keep the original text. Decimal digits are kept as written.
    pub fn format_grouped(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let value = trimmed.parse::<f64>().ok()?;
        if !value.is_finite() {
            return None;
        }
        let plain = if is_plain_decimal(trimmed) {
            trimmed.to_string()
        } else {
            // exponent notation and the like
            value.to_string()
        };
        Some(group_plain_decimal(&plain))
    }

    /// Parse a number that may carry en-CA grouping separators.
    pub fn parse_grouped(s: &str) -> Option<f64> {
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| *c != GROUP_SEPARATOR)
            .collect();
        if cleaned.is_empty() {
            return None;
        }
        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Right-align strings to the width of the widest one.
    pub fn align_right(values: &[String]) -> Vec<String> {
        let width = values
            .iter()
            .map(|v| v.chars().count())
            .max()
            .unwrap_or(0);
        values
            .iter()
            .map(|v| format!("{:>width$}", v, width = width))
            .collect()
    }

    fn is_plain_decimal(s: &str) -> bool {
        let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
        let mut parts = unsigned.splitn(2, '.');
        let int_part = parts.next().unwrap_or("");
        let frac_part = parts.next().unwrap_or("");
        let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
        (!int_part.is_empty() || !frac_part.is_empty()) && all_digits(int_part) && all_digits(frac_part)
    }

    fn group_plain_decimal(s: &str) -> String {
        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };
        let int_part = int_part.trim_start_matches('0');
        let int_part = if int_part.is_empty() { "0" } else { int_part };

        let digits: Vec<char> = int_part.chars().collect();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + frac_part.len() + 2);
        if negative {
            grouped.push('-');
        }
        for (i, digit) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(GROUP_SEPARATOR);
            }
            grouped.push(*digit);
        }
        if !frac_part.is_empty() {
            grouped.push('.');
            grouped.push_str(frac_part);
        }
        grouped
    }

}
