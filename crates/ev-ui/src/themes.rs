use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
pub fn detect_background() -> BackgroundType {
    background_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

/// Classify a `COLORFGBG` value (`"foreground;background"`).
///
/// Background values 0–6 are dark, 7–15 light.  Absent or unparseable
/// values default to dark.
pub fn background_from_colorfgbg(value: Option<&str>) -> BackgroundType {
    let bg = value
        .and_then(|v| v.split(';').next_back())
        .and_then(|bg| bg.trim().parse::<u8>().ok());
    match bg {
        Some(n) if n > 6 => BackgroundType::Light,
        _ => BackgroundType::Dark,
    }
}

/// Accent colour of a metric card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAccent {
    Blue,
    Green,
    Purple,
    Amber,
}

/// Complete theme definition carrying all UI styles used by the dashboard.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub subtitle: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub warning: Style,
    pub error: Style,

    // ── Cards ────────────────────────────────────────────────────────────────
    pub card_border: Style,
    pub card_blue: Style,
    pub card_green: Style,
    pub card_purple: Style,
    pub card_amber: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    pub chart_title: Style,
    pub chart_adoption: Style,
    pub chart_makes: Style,
    pub chart_types: Style,
    pub chart_range: Style,
    /// Unfilled remainder of a bar.
    pub chart_empty: Style,
    pub chart_label: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,

    // ── Filters ──────────────────────────────────────────────────────────────
    /// Field with a value other than "All".
    pub filter_active: Style,
    pub filter_inactive: Style,
    /// Field currently focused for editing.
    pub filter_focus: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            subtitle: Style::default().fg(Color::Gray),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            card_border: Style::default().fg(Color::DarkGray),
            card_blue: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            card_green: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            card_purple: Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
            card_amber: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),

            chart_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            chart_adoption: Style::default().fg(Color::LightBlue),
            chart_makes: Style::default().fg(Color::LightGreen),
            chart_types: Style::default().fg(Color::LightMagenta),
            chart_range: Style::default().fg(Color::Yellow),
            chart_empty: Style::default().fg(Color::DarkGray),
            chart_label: Style::default().fg(Color::Gray),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),

            filter_active: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            filter_inactive: Style::default().fg(Color::Gray),
            filter_focus: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Light-background terminal theme.
    ///
    /// Uses dark colours for text and saturated accents so that content
    /// remains legible against a white/light-grey terminal canvas.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            subtitle: Style::default().fg(Color::DarkGray),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            card_border: Style::default().fg(Color::Gray),
            card_blue: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            card_green: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            card_purple: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            card_amber: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),

            chart_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            chart_adoption: Style::default().fg(Color::Blue),
            chart_makes: Style::default().fg(Color::Green),
            chart_types: Style::default().fg(Color::Magenta),
            chart_range: Style::default().fg(Color::Yellow),
            chart_empty: Style::default().fg(Color::Gray),
            chart_label: Style::default().fg(Color::DarkGray),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),

            filter_active: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            filter_inactive: Style::default().fg(Color::DarkGray),
            filter_focus: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Classic terminal theme using only the basic 8-colour ANSI palette,
    /// without bold modifiers.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            subtitle: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            card_border: Style::default().fg(Color::White),
            card_blue: Style::default().fg(Color::Blue),
            card_green: Style::default().fg(Color::Green),
            card_purple: Style::default().fg(Color::Magenta),
            card_amber: Style::default().fg(Color::Yellow),

            chart_title: Style::default().fg(Color::White),
            chart_adoption: Style::default().fg(Color::Blue),
            chart_makes: Style::default().fg(Color::Green),
            chart_types: Style::default().fg(Color::Magenta),
            chart_range: Style::default().fg(Color::Yellow),
            chart_empty: Style::default().fg(Color::DarkGray),
            chart_label: Style::default().fg(Color::White),

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),

            filter_active: Style::default().fg(Color::Yellow),
            filter_inactive: Style::default().fg(Color::White),
            filter_focus: Style::default().fg(Color::Black).bg(Color::White),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names (including `"auto"`).
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Value style for a metric card accent.
    pub fn card_style(&self, accent: CardAccent) -> Style {
        match accent {
            CardAccent::Blue => self.card_blue,
            CardAccent::Green => self.card_green,
            CardAccent::Purple => self.card_purple,
            CardAccent::Amber => self.card_amber,
        }
    }

    /// Style for filter field `value`, depending on focus and whether it
    /// constrains anything.
    pub fn filter_style(&self, focused: bool, active: bool) -> Style {
        if focused {
            self.filter_focus
        } else if active {
            self.filter_active
        } else {
            self.filter_inactive
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
