use crate::themes::{CardAccent, Theme};
use ev_core::formatting::{format_count, format_miles};
use ev_core::models::Metrics;
use ev_data::projections::top_makes;
use ratatui::text::{Line, Span};

/// Shown when no manufacturer has been counted.
pub const NOT_AVAILABLE: &str = "N/A";

// ── MetricCard ───────────────────────────────────────────────────────────────

/// Single headline figure with a title and a one-line description.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    pub description: String,
    pub accent: CardAccent,
}

impl MetricCard {
    /// Render as three lines: title, value, description.
    pub fn to_lines<'a>(&'a self, theme: &Theme) -> Vec<Line<'a>> {
        vec![
            Line::from(Span::styled(self.title, theme.label)),
            Line::from(Span::styled(
                self.value.as_str(),
                theme.card_style(self.accent),
            )),
            Line::from(Span::styled(self.description.as_str(), theme.dim)),
        ]
    }
}

// ── Card set ─────────────────────────────────────────────────────────────────

/// Build the four headline cards for `metrics`.
///
/// | Card              | Value                               |
/// |-------------------|-------------------------------------|
/// | Total Vehicles    | thousands-separated count           |
/// | Avg. Electric Range | `"<n> miles"`                     |
/// | Top Manufacturer  | highest-count make, or `N/A`        |
/// | Model Years       | number of distinct years            |
pub fn metric_cards(metrics: &Metrics) -> [MetricCard; 4] {
    let top = top_makes(metrics, 1);
    let (top_make, top_description) = match top.first() {
        Some(entry) => (
            entry.label.clone(),
            format!("{} vehicles", format_count(entry.count)),
        ),
        None => (NOT_AVAILABLE.to_string(), "Most registered make".to_string()),
    };

    [
        MetricCard {
            title: "Total Vehicles",
            value: format_count(metrics.total_vehicles),
            description: "Total electric vehicles in dataset".to_string(),
            accent: CardAccent::Blue,
        },
        MetricCard {
            title: "Avg. Electric Range",
            value: format_miles(metrics.electric_range.average),
            description: format!(
                "Across {} vehicles with a reported range",
                format_count(metrics.electric_range.samples)
            ),
            accent: CardAccent::Green,
        },
        MetricCard {
            title: "Top Manufacturer",
            value: top_make,
            description: top_description,
            accent: CardAccent::Purple,
        },
        MetricCard {
            title: "Model Years",
            value: metrics.years.len().to_string(),
            description: "Years of data represented".to_string(),
            accent: CardAccent::Amber,
        },
    ]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
