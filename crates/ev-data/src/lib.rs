//! Data layer for the EV dashboard.
//!
//! Decodes the registration dataset, aggregates it into metrics, applies
//! filters and derives the chart projections consumed by the UI and the
//! HTTP service.

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod projections;
pub mod reader;

pub use ev_core as core;
