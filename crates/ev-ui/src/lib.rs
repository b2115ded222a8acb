//! Terminal UI layer for the EV population dashboard.
//!
//! Provides themes, the header, metric card, bar chart and filter
//! components, the dashboard and county table views, and the application
//! event loop built on top of [`ratatui`].

pub mod app;
pub mod components;
pub mod dashboard_view;
pub mod table_view;
pub mod themes;

pub use ev_core as core;
