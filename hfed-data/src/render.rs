//! Models handed to the chart/table collaborators and the seam they sit
//! behind.

use hfed_core::{
    catalog::y_axis_label,
    download::COLUMN_LABELS,
    normalize::row_timestamp,
    observation::{columns, Dataset, Row},
    province::Province,
};
use hfed_utils::numbers::{align_right, parse_grouped};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 10;

pub const X_AXIS_LABEL: &str = "Date and time";

pub const NO_DATA_MESSAGE: &str = "No data available for the selected parameters.";

pub const RESTRICTED_MESSAGE: &str = "Due to the large file size, this variable is not available for preview. Please download the file or access data using the API (see API tab for more information).";

/// Receives whatever a load decides to show. Each call replaces what was
/// shown before.
pub trait Renderer {
    fn render_chart(&self, chart: ChartSeries);
    fn render_table(&self, page: TablePage);
    fn render_message(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub series_label: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Build a series from normalized rows. Rows without a timestamp or a
    /// numeric value are left out.
    pub fn from_rows(province: Province, variable: &str, rows: &[Row]) -> ChartSeries {
        let label = province.variable_label(variable);
        let points = rows
            .iter()
            .filter_map(|row| {
                let timestamp = row_timestamp(row)?;
                let value = row.get(columns::OBS_VALUE).and_then(|v| parse_grouped(v))?;
                Some(ChartPoint {
                    timestamp: timestamp.to_string(),
                    value,
                })
            })
            .collect();
        ChartSeries {
            title: format!("{} in {}", label, province),
            series_label: label.to_string(),
            x_label: X_AXIS_LABEL,
            y_label: y_axis_label(province, variable),
            points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageButton {
    Page { number: usize, current: bool },
    Ellipsis,
}

/// Pager buttons: the first and last page, the current page and its
/// neighbours, with one ellipsis standing in for each gap.
pub fn page_buttons(current: usize, total: usize) -> Vec<PageButton> {
    let mut buttons = Vec::new();
    for number in 1..=total {
        if number == 1 || number == total || number.abs_diff(current) <= 1 {
            buttons.push(PageButton::Page {
                number,
                current: number == current,
            });
        } else if buttons.last() != Some(&PageButton::Ellipsis) {
            buttons.push(PageButton::Ellipsis);
        }
    }
    buttons
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableColumn {
    pub key: &'static str,
    pub label: &'static str,
}

/// One page of the table view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePage {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Row>,
    /// 1-based, clamped into `1..=total_pages`.
    pub page: usize,
    pub total_pages: usize,
    /// 1-based index of the first row shown; 0 when there are no rows.
    pub first_entry: usize,
    pub last_entry: usize,
    pub total_entries: usize,
    pub buttons: Vec<PageButton>,
}

impl TablePage {
    pub fn new(dataset: &Dataset, page_size: usize, page: usize) -> TablePage {
        let page_size = page_size.max(1);
        let total_entries = dataset.len();
        let total_pages = total_entries.div_ceil(page_size).max(1);
        let page = page.clamp(1, total_pages);
        let start = (page - 1) * page_size;
        let end = (start + page_size).min(total_entries);

        // only the display columns the response actually carries
        let columns = match dataset.rows.first() {
            Some(first) => COLUMN_LABELS
                .iter()
                .filter(|(key, _)| first.contains_key(*key))
                .map(|&(key, label)| TableColumn { key, label })
                .collect(),
            None => Vec::new(),
        };

        TablePage {
            columns,
            rows: dataset.rows[start..end].to_vec(),
            page,
            total_pages,
            first_entry: if total_entries == 0 { 0 } else { start + 1 },
            last_entry: end,
            total_entries,
            buttons: page_buttons(page, total_pages),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Showing {} to {} of {} entries",
            self.first_entry, self.last_entry, self.total_entries
        )
    }

    pub fn header(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.label).collect()
    }

    /// Cell text per row in column order, observation values right-aligned
    /// to a common width.
    pub fn cells(&self) -> Vec<Vec<String>> {
        let mut cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| row.get(c.key).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        if let Some(index) = self.columns.iter().position(|c| c.key == columns::OBS_VALUE) {
            let values: Vec<String> = cells.iter().map(|r| r[index].clone()).collect();
            for (row, value) in cells.iter_mut().zip(align_right(&values)) {
                row[index] = value;
            }
        }
        cells
    }
}
