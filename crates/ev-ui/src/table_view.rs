//! County distribution table for the EV dashboard.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per county
//! (top 10 by count) and each county's share of the filtered total.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use ev_core::formatting::{format_count, percentage};
use ev_core::models::{CategoryCount, Metrics};
use ev_data::projections::county_distribution;

use crate::themes::Theme;

/// Number of counties listed in the table.
pub const COUNTY_TABLE_ROWS: usize = 10;

/// Title of the county table block.
pub const COUNTY_TABLE_TITLE: &str = "County Distribution (Top 10)";

/// Data for a single row in the county table.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyRow {
    pub county: String,
    pub vehicles: u64,
    /// Share of all vehicles in the metrics, in percent (one decimal).
    pub share: f64,
}

/// Top counties by count with their share of `metrics.total_vehicles`.
pub fn county_rows(metrics: &Metrics) -> Vec<CountyRow> {
    county_distribution(metrics)
        .into_iter()
        .take(COUNTY_TABLE_ROWS)
        .map(|CategoryCount { label, count }| CountyRow {
            county: label,
            vehicles: count,
            share: percentage(count, metrics.total_vehicles, 1),
        })
        .collect()
}

/// Render the county table into `area`.
pub fn render_county_table(frame: &mut Frame, area: Rect, rows: &[CountyRow], theme: &Theme) {
    let header = Row::new(
        ["County", "Vehicles", "Share"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(row.county.clone()),
                Cell::from(format_count(row.vehicles)),
                Cell::from(format!("{:.1}%", row.share)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(16),
        Constraint::Length(12),
        Constraint::Length(8),
    ];

    let table = Table::new(data_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(Span::styled(
                    format!(" {} ", COUNTY_TABLE_TITLE),
                    theme.chart_title,
                )),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render the "No data available" placeholder shown when the dataset has no
/// records.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No data available", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "The dataset contains no vehicle records.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'r' to reload or 'q' to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" EV Dashboard "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
