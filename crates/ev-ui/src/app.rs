//! Main application state and TUI event loop for the EV dashboard.
//!
//! [`App`] owns the theme, the loaded dataset, the filter selection and the
//! metrics of the currently filtered subset.  Data arrives from the
//! background [`DataLoader`](ev_runtime::loader::DataLoader) as
//! [`LoadEvent`]s; key presses mutate the filter and trigger re-aggregation.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tokio::sync::mpsc;

use ev_core::models::{FilterCriteria, Metrics};
use ev_data::analysis::AnalysisResult;
use ev_data::projections::FilterOptions;
use ev_runtime::loader::{LoadEvent, LoaderHandle};

use crate::components::filter_controls::FilterControls;
use crate::dashboard_view::{self, DashboardViewData};
use crate::table_view;
use crate::themes::Theme;

// ── LoadState ─────────────────────────────────────────────────────────────────

/// A dataset ready for display.
#[derive(Debug, Clone)]
pub struct ReadyState {
    pub result: AnalysisResult,
    /// Option lists drawn from the unfiltered metrics.
    pub options: FilterOptions,
    /// Metrics of the filtered subset.
    pub metrics: Metrics,
}

/// What the dashboard currently has to show.
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Failed(String),
    Ready(Box<ReadyState>),
}

/// Side effect requested by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Reload,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the EV dashboard TUI.
pub struct App {
    pub theme: Theme,
    /// Data source description for the header.
    pub source: String,
    /// Entries in the top-manufacturers chart.
    pub top_makes: usize,
    pub filters: FilterControls,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    state: LoadState,
}

impl App {
    pub fn new(theme_name: &str, source: String, criteria: FilterCriteria, top_makes: usize) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            source,
            top_makes,
            filters: FilterControls::new(criteria),
            should_quit: false,
            state: LoadState::Loading,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Metrics currently on screen, if a dataset is loaded.
    pub fn metrics(&self) -> Option<&Metrics> {
        match &self.state {
            LoadState::Ready(ready) => Some(&ready.metrics),
            _ => None,
        }
    }

    // ── Public event loop ─────────────────────────────────────────────────────

    /// Run the dashboard TUI, receiving datasets from `rx`.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// that the terminal event loop stays on the current thread while load
    /// results arrive on the async channel via `try_recv`.
    ///
    /// The loop exits on `q`, `Q`, or `Ctrl+C`.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<LoadEvent>,
        loader: LoaderHandle,
    ) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result: io::Result<()> = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => match self.handle_key(key) {
                        Some(AppAction::Quit) => break Ok(()),
                        Some(AppAction::Reload) => {
                            if !loader.reload() {
                                tracing::debug!("reload already pending");
                            }
                        }
                        None => {}
                    },
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            // Drain any pending load results (non-blocking).
            loop {
                match rx.try_recv() {
                    Ok(event) => self.apply_load_event(event),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        loader.abort();

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── State transitions ─────────────────────────────────────────────────────

    /// Install a load outcome.
    ///
    /// A failure while a dataset is already on screen keeps that dataset.
    pub fn apply_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Loaded(result) => {
                let options = result.dataset.filter_options();
                let metrics = result.dataset.apply_filter(self.filters.criteria());
                tracing::debug!(
                    total = result.dataset.len(),
                    filtered = metrics.total_vehicles,
                    "dashboard dataset updated"
                );
                self.state = LoadState::Ready(Box::new(ReadyState {
                    result,
                    options,
                    metrics,
                }));
            }
            LoadEvent::Failed(message) => {
                if matches!(self.state, LoadState::Ready(_)) {
                    tracing::warn!(error = %message, "reload failed; keeping current dataset");
                } else {
                    self.state = LoadState::Failed(message);
                }
            }
        }
    }

    /// Translate a key press into state changes and an optional action.
    ///
    /// | Key              | Effect                          |
    /// |------------------|---------------------------------|
    /// | `q`, `Ctrl+C`    | quit                            |
    /// | `r`              | reload (retry after an error)   |
    /// | `c`              | clear all filters               |
    /// | `Tab`, `→`       | focus next filter field         |
    /// | `Shift+Tab`, `←` | focus previous filter field     |
    /// | `↓` / `↑`        | next / previous filter value    |
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(AppAction::Quit)
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(AppAction::Quit),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if matches!(self.state, LoadState::Failed(_)) {
                    self.state = LoadState::Loading;
                }
                Some(AppAction::Reload)
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                if self.filters.clear() {
                    self.refresh_metrics();
                }
                None
            }
            KeyCode::Tab | KeyCode::Right => {
                self.filters.focus_next();
                None
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.filters.focus_prev();
                None
            }
            KeyCode::Down | KeyCode::Up => {
                let forward = key.code == KeyCode::Down;
                let changed = match &self.state {
                    LoadState::Ready(ready) => self.filters.cycle(&ready.options, forward),
                    _ => false,
                };
                if changed {
                    self.refresh_metrics();
                }
                None
            }
            _ => None,
        }
    }

    /// Re-aggregate the filtered subset after a filter change.
    fn refresh_metrics(&mut self) {
        if let LoadState::Ready(ready) = &mut self.state {
            ready.metrics = ready.result.dataset.apply_filter(self.filters.criteria());
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        match &self.state {
            LoadState::Loading => dashboard_view::render_loading(frame, area, &self.theme),
            LoadState::Failed(message) => {
                dashboard_view::render_error(frame, area, message, &self.theme)
            }
            LoadState::Ready(ready) if ready.result.dataset.is_empty() => {
                table_view::render_no_data(frame, area, &self.theme)
            }
            LoadState::Ready(ready) => {
                let data = DashboardViewData {
                    source: &self.source,
                    total_records: ready.result.dataset.len() as u64,
                    metrics: &ready.metrics,
                    filters: &self.filters,
                    top_makes: self.top_makes,
                };
                dashboard_view::render_dashboard(frame, area, &data, &self.theme);
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
