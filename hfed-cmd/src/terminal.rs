//! Plain-text (or JSON) renderer for the terminal.

use hfed_data::render::{ChartSeries, PageButton, Renderer, TablePage};
use log::warn;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRenderer {
    pub json: bool,
}

impl TerminalRenderer {
    pub fn new(json: bool) -> Self {
        TerminalRenderer { json }
    }

    fn print_json<S: Serialize>(&self, value: &S) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{}", text),
            Err(e) => warn!("Failed to serialize output: {}", e),
        }
    }
}

impl Renderer for TerminalRenderer {
    fn render_chart(&self, chart: ChartSeries) {
        if self.json {
            self.print_json(&chart);
            return;
        }
        for line in chart_lines(&chart) {
            println!("{}", line);
        }
    }

    fn render_table(&self, page: TablePage) {
        if self.json {
            self.print_json(&page);
            return;
        }
        for line in table_lines(&page) {
            println!("{}", line);
        }
    }

    fn render_message(&self, message: &str) {
        if self.json {
            self.print_json(&serde_json::json!({ "message": message }));
            return;
        }
        println!("{}", message);
    }
}

/// Summary of a chart: labels, extent and the latest point.
pub fn chart_lines(chart: &ChartSeries) -> Vec<String> {
    let mut lines = vec![
        chart.title.clone(),
        format!("x: {}  y: {}", chart.x_label, chart.y_label),
    ];
    let (Some(first), Some(last)) = (chart.points.first(), chart.points.last()) else {
        lines.push("0 points".to_string());
        return lines;
    };
    let min = chart
        .points
        .iter()
        .map(|p| p.value)
        .fold(f64::INFINITY, f64::min);
    let max = chart
        .points
        .iter()
        .map(|p| p.value)
        .fold(f64::NEG_INFINITY, f64::max);
    lines.push(format!(
        "{} points from {} to {}",
        chart.points.len(),
        first.timestamp,
        last.timestamp
    ));
    lines.push(format!("min {}  max {}  latest {}", min, max, last.value));
    lines
}

/// Column-aligned table text followed by the entry summary and the pager.
pub fn table_lines(page: &TablePage) -> Vec<String> {
    let header = page.header();
    let cells = page.cells();
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, label)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(label.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let join = |fields: Vec<String>| fields.join("  ").trim_end().to_string();
    let mut lines = Vec::with_capacity(cells.len() + 3);
    lines.push(join(
        header
            .iter()
            .zip(&widths)
            .map(|(label, w)| format!("{:<w$}", label, w = *w))
            .collect(),
    ));
    for row in &cells {
        lines.push(join(
            row.iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
                .collect(),
        ));
    }
    lines.push(page.summary());
    lines.push(pager_line(&page.buttons));
    lines
}

pub fn pager_line(buttons: &[PageButton]) -> String {
    buttons
        .iter()
        .map(|button| match button {
            PageButton::Page {
                number,
                current: true,
            } => format!("[{}]", number),
            PageButton::Page { number, .. } => number.to_string(),
            PageButton::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
