//! Load one selection through a session and show it on the terminal.

use crate::{catalog::check_variable, terminal::TerminalRenderer, Config};
use chrono::NaiveDate;
use hfed_core::{
    catalog::{date_bounds, DEFAULT_WINDOW_DAYS},
    client::HttpTransport,
    date_range::DateRange,
    download,
    province::Province,
};
use hfed_data::session::{LoadOutcome, Selection, Session, View};
use hfed_utils::dates::{past_days, today};
use log::{info, warn};
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub province: Province,
    pub variable: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub full_series: bool,
    pub counterpart: Option<String>,
    pub view: View,
    pub page: usize,
    pub download: Option<PathBuf>,
    pub json: bool,
}

impl FetchRequest {
    /// Date range to request: none for the full series, otherwise the given
    /// bounds with gaps filled from the default 90-day window. The start is
    /// raised to the variable's first published day and the end is capped at
    /// today.
    pub fn resolve_range(&self, today: NaiveDate) -> anyhow::Result<Option<DateRange>> {
        if self.full_series {
            return Ok(None);
        }
        let bounds = date_bounds(self.province, &self.variable, today);
        let end = match self.end {
            Some(end) if end > bounds.max => {
                warn!("{} is in the future, moving end to {}", end, bounds.max);
                bounds.max
            }
            Some(end) => end,
            None => bounds.initial.1,
        };
        let start = match (self.start, self.end) {
            (Some(start), _) => start,
            (None, None) => bounds.initial.0,
            (None, Some(_)) => past_days(end, DEFAULT_WINDOW_DAYS).0,
        };
        let start = if start < bounds.min {
            warn!(
                "{} {} starts on {}, moving start from {}",
                self.province, self.variable, bounds.min, start
            );
            bounds.min
        } else {
            start
        };
        if start > end {
            anyhow::bail!("start date {} is after end date {}", start, end);
        }
        Ok(Some(DateRange(start, end)))
    }

    pub fn selection(&self, range: Option<DateRange>) -> Selection {
        Selection {
            counterpart: self.counterpart.clone(),
            page: self.page,
            ..Selection::new(self.province, &self.variable, range, self.view)
        }
    }
}

pub async fn run_fetch(config: &Config, request: FetchRequest) -> anyhow::Result<()> {
    check_variable(request.province, &request.variable);
    let range = request.resolve_range(today())?;
    let selection = request.selection(range);

    if let (Some(filter), Some(value)) = (selection.secondary_filter(), &request.counterpart) {
        if !filter.contains(value) {
            warn!(
                "{} is not a {} option for {}; options are {}",
                value,
                filter.label,
                request.variable,
                filter.options.join(", ")
            );
        }
    }

    let transport = HttpTransport::new(Duration::from_secs(config.timeout))?;
    let session = Session::new(
        config.session_config(),
        transport,
        TerminalRenderer::new(request.json),
    );

    match session.load(&selection).await {
        LoadOutcome::Failed(e) => warn!("Load failed: {}", e),
        outcome => info!("Load finished: {:?}", outcome),
    }

    if let Some(path) = request.download {
        let path = if path.is_dir() {
            path.join(download::file_name(request.province, &request.variable))
        } else {
            path
        };
        match session.download_csv() {
            Some(csv) => {
                std::fs::write(&path, csv)?;
                info!("Wrote {} rows to {}", session.current_data().len(), path.display());
            }
            None => warn!("No data to download"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: Option<NaiveDate>, end: Option<NaiveDate>) -> FetchRequest {
        FetchRequest {
            province: Province::NewBrunswick,
            variable: "DEMAND".to_string(),
            start,
            end,
            full_series: false,
            counterpart: None,
            view: View::Table,
            page: 1,
            download: None,
            json: false,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_range_defaults() {
        let today = date(2024, 10, 31);
        let range = request(None, None).resolve_range(today).unwrap().unwrap();
        assert_eq!(range, DateRange(date(2024, 8, 2), today));
    }

    #[test]
    fn test_resolve_range_caps_end_at_today() {
        let today = date(2024, 10, 31);
        let r = request(Some(date(2024, 10, 1)), Some(date(2025, 3, 1)));
        assert_eq!(
            r.resolve_range(today).unwrap(),
            Some(DateRange(date(2024, 10, 1), today))
        );

        let r = request(None, Some(date(2025, 3, 1)));
        assert_eq!(
            r.resolve_range(today).unwrap(),
            Some(DateRange(date(2024, 8, 2), today))
        );

        let r = request(Some(date(2024, 11, 5)), Some(date(2024, 11, 9)));
        assert!(r.resolve_range(today).is_err());
    }

    #[test]
    fn test_resolve_range_explicit() {
        let r = request(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));
        assert_eq!(
            r.resolve_range(date(2024, 10, 31)).unwrap(),
            Some(DateRange(date(2024, 1, 1), date(2024, 1, 31)))
        );
    }

    #[test]
    fn test_resolve_range_clamps_to_min_date() {
        let r = request(Some(date(1990, 1, 1)), Some(date(2024, 1, 31)));
        let range = r.resolve_range(date(2024, 10, 31)).unwrap().unwrap();
        assert_eq!(range.start(), Province::NewBrunswick.min_start_date("DEMAND"));
    }

    #[test]
    fn test_resolve_range_rejects_reversed() {
        let r = request(Some(date(2024, 2, 1)), Some(date(2024, 1, 1)));
        assert!(r.resolve_range(date(2024, 10, 31)).is_err());
    }

    #[test]
    fn test_full_series() {
        let mut r = request(None, None);
        r.full_series = true;
        assert_eq!(r.resolve_range(date(2024, 10, 31)).unwrap(), None);
    }

    #[test]
    fn test_selection_carries_counterpart() {
        let mut r = request(None, None);
        r.counterpart = Some("CA_QC".to_string());
        r.page = 3;
        let selection = r.selection(None);
        assert_eq!(selection.counterpart.as_deref(), Some("CA_QC"));
        assert_eq!(selection.page, 3);
        assert_eq!(selection.view, View::Table);
    }
}
