pub mod bar_chart;
pub mod filter_controls;
pub mod header;
pub mod metric_card;
