use crate::themes::Theme;
use ev_core::formatting::format_count;
use ev_core::models::CategoryCount;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Labels wider than this many columns are shortened.
pub const MAX_LABEL_WIDTH: usize = 15;

/// Columns kept from a shortened label before the ellipsis.
pub const TRUNCATED_LABEL_WIDTH: usize = 12;

/// Configuration controlling visual appearance of a bar chart.
#[derive(Debug, Clone)]
pub struct BarChartConfig {
    /// Width in terminal columns of the bar portion (excluding label and count).
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
    /// Shorten labels wider than [`MAX_LABEL_WIDTH`].
    pub truncate_labels: bool,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            width: 30,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
            truncate_labels: false,
        }
    }
}

/// Shorten `label` to 12 columns plus `...` when it is wider than 15 columns.
///
/// Width is measured in terminal columns, so wide glyphs count double.
pub fn truncate_label(label: &str) -> String {
    if label.width() <= MAX_LABEL_WIDTH {
        return label.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in label.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > TRUNCATED_LABEL_WIDTH {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str("...");
    out
}

/// Number of filled cells for `count` on a bar of `width` cells scaled to `max`.
///
/// Any non-zero count gets at least one cell.
pub fn bar_cells(count: u64, max: u64, width: u16) -> u16 {
    if max == 0 || count == 0 {
        return 0;
    }
    let cells = (count as u128 * width as u128 / max as u128) as u16;
    cells.clamp(1, width)
}

/// `n` copies of `ch`.
fn cells(ch: char, n: u16) -> String {
    std::iter::repeat(ch).take(n as usize).collect()
}

// ── HorizontalBarChart ───────────────────────────────────────────────────────

/// Titled list of `label  ████░░░  count` rows, scaled to the largest count.
pub struct HorizontalBarChart<'a> {
    pub title: &'a str,
    pub entries: &'a [CategoryCount],
    /// Fill colour for the bars.
    pub style: Style,
    pub theme: &'a Theme,
    pub config: BarChartConfig,
}

impl<'a> HorizontalBarChart<'a> {
    pub fn new(title: &'a str, entries: &'a [CategoryCount], style: Style, theme: &'a Theme) -> Self {
        Self {
            title,
            entries,
            style,
            theme,
            config: BarChartConfig::default(),
        }
    }

    pub fn with_truncated_labels(mut self) -> Self {
        self.config.truncate_labels = true;
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.config.width = width;
        self
    }

    /// Size the bars so that whole rows fit in `columns` terminal columns.
    /// Bars never shrink below one cell.
    pub fn fit_width(mut self, columns: u16) -> Self {
        let label_width = self.labels().iter().map(|l| l.width()).max().unwrap_or(0);
        let count_width = self
            .entries
            .iter()
            .map(|e| format_count(e.count).len())
            .max()
            .unwrap_or(0);
        // One space after the label and one before the count.
        let reserved = label_width + count_width + 2;
        self.config.width = (columns as usize).saturating_sub(reserved).max(1) as u16;
        self
    }

    fn labels(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                if self.config.truncate_labels {
                    truncate_label(&e.label)
                } else {
                    e.label.clone()
                }
            })
            .collect()
    }

    /// Render the title followed by one line per entry.  An empty entry list
    /// renders a dimmed "No data" line.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let mut lines = vec![Line::from(Span::styled(self.title, self.theme.chart_title))];

        if self.entries.is_empty() {
            lines.push(Line::from(Span::styled("No data", self.theme.dim)));
            return lines;
        }

        let labels = self.labels();
        let label_width = labels.iter().map(|l| l.width()).max().unwrap_or(0);
        let max = self.entries.iter().map(|e| e.count).max().unwrap_or(0);

        for (entry, label) in self.entries.iter().zip(labels) {
            let filled = bar_cells(entry.count, max, self.config.width);
            let empty = self.config.width.saturating_sub(filled);
            let padding = " ".repeat(label_width.saturating_sub(label.width()));

            lines.push(Line::from(vec![
                Span::styled(format!("{label}{padding} "), self.theme.chart_label),
                Span::styled(cells(self.config.filled_char, filled), self.style),
                Span::styled(cells(self.config.empty_char, empty), self.theme.chart_empty),
                Span::styled(format!(" {}", format_count(entry.count)), self.theme.value),
            ]));
        }

        lines
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
