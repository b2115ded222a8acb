//! Main dashboard screen for the EV population TUI.
//!
//! Lays out the header, filter controls, four metric cards, a 2×2 grid of
//! bar charts and the county table, plus the loading and error screens
//! shown before a dataset is available.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use ev_core::formatting::format_count;
use ev_core::models::Metrics;
use ev_data::projections::{model_year_trend, range_distribution, top_makes, vehicle_type_distribution};

use crate::components::bar_chart::HorizontalBarChart;
use crate::components::filter_controls::FilterControls;
use crate::components::header::Header;
use crate::components::metric_card::metric_cards;
use crate::table_view::{county_rows, render_county_table, COUNTY_TABLE_ROWS};
use crate::themes::Theme;

pub const FOOTER_TEXT: &str = "Data sourced from Washington State Department of Licensing";

pub const KEY_HELP: &str = "Tab/←/→ field  ↑/↓ value  c clear  r reload  q quit";

pub const CHART_ADOPTION: &str = "EV Adoption Over Time";
pub const CHART_MAKES: &str = "Top EV Manufacturers";
pub const CHART_TYPES: &str = "Vehicle Type Distribution";
pub const CHART_RANGE: &str = "Electric Range Analysis";

/// Everything the dashboard screen needs for one frame.
pub struct DashboardViewData<'a> {
    /// Short source description for the header.
    pub source: &'a str,
    /// Size of the unfiltered dataset.
    pub total_records: u64,
    /// Metrics of the currently filtered subset.
    pub metrics: &'a Metrics,
    pub filters: &'a FilterControls,
    /// Number of manufacturers in the top-makes chart.
    pub top_makes: usize,
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

pub fn render_dashboard(frame: &mut Frame, area: Rect, data: &DashboardViewData<'_>, theme: &Theme) {
    let [header_area, filter_area, cards_area, upper_charts, lower_charts, table_area, footer_area] =
        Layout::vertical([
            Constraint::Length(Header::HEIGHT),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(8),
            Constraint::Min(8),
            Constraint::Length(COUNTY_TABLE_ROWS as u16 + 3),
            Constraint::Length(2),
        ])
        .areas(area);

    let header = Header::new(data.source, Some(data.total_records), theme);
    frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);

    frame.render_widget(Paragraph::new(Text::from(filter_lines(data, theme))), filter_area);

    render_cards(frame, cards_area, data.metrics, theme);
    render_charts(frame, upper_charts, lower_charts, data, theme);

    render_county_table(frame, table_area, &county_rows(data.metrics), theme);

    let footer = vec![
        Line::from(Span::styled(FOOTER_TEXT, theme.dim)),
        Line::from(Span::styled(KEY_HELP, theme.dim)),
    ];
    frame.render_widget(Paragraph::new(Text::from(footer)), footer_area);
}

/// Filter controls followed by a `Showing N of M vehicles` status line.
pub fn filter_lines<'a>(data: &DashboardViewData<'_>, theme: &Theme) -> Vec<Line<'a>> {
    let showing = if data.filters.criteria().is_empty() {
        format!("Showing all {} vehicles", format_count(data.total_records))
    } else {
        format!(
            "Showing {} of {} vehicles",
            format_count(data.metrics.total_vehicles),
            format_count(data.total_records)
        )
    };
    vec![
        data.filters.to_line(theme),
        Line::from(Span::styled(showing, theme.info)),
        Line::from(""),
    ]
}

fn render_cards(frame: &mut Frame, area: Rect, metrics: &Metrics, theme: &Theme) {
    let cards = metric_cards(metrics);
    let areas: [Rect; 4] = Layout::horizontal([Constraint::Ratio(1, 4); 4]).areas(area);
    for (card, card_area) in cards.iter().zip(areas) {
        let widget = Paragraph::new(Text::from(card.to_lines(theme))).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.card_border),
        );
        frame.render_widget(widget, card_area);
    }
}

fn render_charts(
    frame: &mut Frame,
    upper: Rect,
    lower: Rect,
    data: &DashboardViewData<'_>,
    theme: &Theme,
) {
    let [adoption_area, makes_area]: [Rect; 2] =
        Layout::horizontal([Constraint::Ratio(1, 2); 2]).areas(upper);
    let [types_area, range_area]: [Rect; 2] =
        Layout::horizontal([Constraint::Ratio(1, 2); 2]).areas(lower);

    let years = model_year_trend(data.metrics);
    let makes = top_makes(data.metrics, data.top_makes);
    let types = vehicle_type_distribution(data.metrics);
    let ranges = range_distribution(data.metrics);

    let charts = [
        (
            adoption_area,
            HorizontalBarChart::new(CHART_ADOPTION, &years, theme.chart_adoption, theme),
        ),
        (
            makes_area,
            HorizontalBarChart::new(CHART_MAKES, &makes, theme.chart_makes, theme)
                .with_truncated_labels(),
        ),
        (
            types_area,
            HorizontalBarChart::new(CHART_TYPES, &types, theme.chart_types, theme),
        ),
        (
            range_area,
            HorizontalBarChart::new(CHART_RANGE, &ranges, theme.chart_range, theme),
        ),
    ];

    for (chart_area, chart) in charts {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.card_border);
        let inner_width = block.inner(chart_area).width;
        let lines = chart.fit_width(inner_width).to_lines();
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), chart_area);
    }
}

// ── Status screens ────────────────────────────────────────────────────────────

/// Shown until the first load completes.
pub fn render_loading(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Loading EV data...", theme.info)),
        Line::from(""),
        Line::from(Span::styled(
            "Processing electric vehicle population dataset",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" EV Dashboard "),
        ),
        area,
    );
}

/// Shown when loading failed and no cached dataset exists.
pub fn render_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Error Loading Data", theme.error)),
        Line::from(""),
        Line::from(Span::styled(
            "Failed to load data. Please try again later.",
            theme.text,
        )),
        Line::from(Span::styled(message.to_string(), theme.dim)),
        Line::from(""),
        Line::from(Span::styled("Press 'r' to retry or 'q' to exit", theme.warning)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" EV Dashboard "),
            ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
