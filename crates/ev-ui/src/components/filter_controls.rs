//! Filter selection state and its one-line rendering.
//!
//! Each of the four [`FilterField`]s cycles through "All" followed by the
//! sorted options of the unfiltered dataset.

use crate::themes::Theme;
use ev_core::models::{FilterCriteria, FilterField};
use ev_data::projections::FilterOptions;
use ratatui::text::{Line, Span};

/// Focused field plus the current criteria.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterControls {
    focus: usize,
    criteria: FilterCriteria,
}

impl FilterControls {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self { focus: 0, criteria }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn focused(&self) -> FilterField {
        FilterField::ALL[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FilterField::ALL.len();
    }

    pub fn focus_prev(&mut self) {
        let n = FilterField::ALL.len();
        self.focus = (self.focus + n - 1) % n;
    }

    /// Step the focused field's value forward (`true`) or backward through
    /// `All, options[0], …, options[n-1]`, wrapping at both ends.
    ///
    /// Returns `true` when the criteria changed.
    pub fn cycle(&mut self, options: &FilterOptions, forward: bool) -> bool {
        let field = self.focused();
        let values = options.for_field(field);
        if values.is_empty() {
            return false;
        }

        // Position 0 is "All"; option i sits at i + 1.
        let slots = values.len() + 1;
        let current = self
            .criteria
            .get(field)
            .and_then(|v| values.iter().position(|o| o == v))
            .map(|i| i + 1);

        let next = match (current, forward) {
            (Some(pos), true) => (pos + 1) % slots,
            (Some(pos), false) => (pos + slots - 1) % slots,
            // Unset, or a value the dataset does not contain.
            (None, true) => 1,
            (None, false) => slots - 1,
        };

        let value = (next > 0).then(|| values[next - 1].clone());
        let changed = self.criteria.get(field) != value.as_deref();
        self.criteria.set(field, value);
        changed
    }

    /// Reset every field to "All".  Returns `true` if anything was set.
    pub fn clear(&mut self) -> bool {
        let changed = !self.criteria.is_empty();
        self.criteria = FilterCriteria::default();
        changed
    }

    /// Render as `Manufacturer: [TESLA]  Vehicle Type: [All Vehicle Types] …`.
    pub fn to_line<'a>(&self, theme: &Theme) -> Line<'a> {
        let mut spans = Vec::with_capacity(FilterField::ALL.len() * 3);
        for (i, field) in FilterField::ALL.iter().enumerate() {
            let active = self.criteria.get(*field);
            let value = active.unwrap_or(field.all_label()).to_string();
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(format!("{}: ", field.display_name()), theme.label));
            spans.push(Span::styled(
                format!("[{value}]"),
                theme.filter_style(i == self.focus, active.is_some()),
            ));
        }
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
