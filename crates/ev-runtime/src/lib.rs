//! Runtime layer for the EV dashboard.
//!
//! Owns the data-acquisition boundary, the TTL-cached data manager, the
//! background loader used by the terminal dashboard and the HTTP service.

pub mod data_manager;
pub mod loader;
pub mod server;
pub mod source;

pub use ev_core as core;
pub use ev_data as data;
