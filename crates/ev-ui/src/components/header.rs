use crate::themes::Theme;
use ev_core::formatting::format_count;
use ratatui::text::{Line, Span};

/// Application title shown on the first header line.
pub const TITLE: &str = "Electric Vehicle Population Dashboard";

/// Subtitle shown beneath the title.
pub const SUBTITLE: &str = "Analytics and insights from the EV population dataset";

/// Width of the `=` rule under the title block.
pub const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering five lines:
///
/// 1. Application title.
/// 2. Subtitle.
/// 3. A 60-column `=` separator.
/// 4. Source and record count in `[ source | N records ]` format.
/// 5. An empty line.
pub struct Header<'a> {
    /// Short description of the data source (file name or URL).
    pub source: &'a str,
    /// Number of records in the loaded dataset, if any.
    pub records: Option<u64>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(source: &'a str, records: Option<u64>, theme: &'a Theme) -> Self {
        Self {
            source,
            records,
            theme,
        }
    }

    /// Number of lines produced by [`Header::to_lines`].
    pub const HEIGHT: u16 = 5;

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let records = match self.records {
            Some(1) => "1 record".to_string(),
            Some(n) => format!("{} records", format_count(n)),
            None => "loading".to_string(),
        };

        vec![
            Line::from(Span::styled(TITLE, self.theme.header)),
            Line::from(Span::styled(SUBTITLE, self.theme.subtitle)),
            Line::from(Span::styled("=".repeat(SEPARATOR_WIDTH), self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.source, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(records, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
