//! Analysis pipeline for the EV dashboard.
//!
//! Aggregates a decoded table once, keeps the rows next to their unfiltered
//! metrics so filters can be re-applied, and builds the report payloads
//! served to the UI, the HTTP service and the summary view.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use ev_core::models::{CategoryCount, FilterCriteria, Metrics, VehicleRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::aggregate;
use crate::filter::filter_records;
use crate::projections::{
    cafv_distribution, county_distribution, filter_options, model_year_trend, range_distribution,
    top_makes, vehicle_type_distribution, FilterOptions,
};

/// Number of manufacturers in [`QuickSummary::top_makes`].
pub const QUICK_SUMMARY_TOP_MAKES: usize = 5;

// ── Dataset ───────────────────────────────────────────────────────────────────

/// Decoded rows together with their unfiltered metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<VehicleRecord>,
    pub metrics: Metrics,
}

impl Dataset {
    /// Aggregate `records` and keep both.
    pub fn new(records: Vec<VehicleRecord>) -> Self {
        let metrics = aggregate(&records);
        Self { records, metrics }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records matching `criteria`, in input order.
    pub fn filtered_records(&self, criteria: &FilterCriteria) -> Vec<&VehicleRecord> {
        filter_records(&self.records, criteria)
    }

    /// Metrics of the subset matching `criteria`.
    ///
    /// The identity filter returns a copy of the unfiltered metrics without
    /// re-aggregating.
    pub fn apply_filter(&self, criteria: &FilterCriteria) -> Metrics {
        if criteria.is_empty() {
            return self.metrics.clone();
        }
        let subset = self.filtered_records(criteria);
        debug!(
            "Filter kept {} of {} records",
            subset.len(),
            self.records.len()
        );
        aggregate(subset)
    }

    /// Filter option lists drawn from the unfiltered metrics.
    pub fn filter_options(&self) -> FilterOptions {
        filter_options(&self.metrics)
    }
}

// ── AnalysisResult ────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// Number of records aggregated.
    pub records_processed: usize,
    /// Human-readable description of where the rows came from.
    pub source: String,
    /// Wall-clock seconds spent aggregating.
    pub aggregate_time_seconds: f64,
}

/// The output of [`analyze`]; cheap to clone.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub dataset: Arc<Dataset>,
    pub metadata: AnalysisMetadata,
}

/// Aggregate `records` loaded from `source`.
pub fn analyze(records: Vec<VehicleRecord>, source: &str) -> AnalysisResult {
    let start = Instant::now();
    let dataset = Dataset::new(records);
    let aggregate_time = start.elapsed().as_secs_f64();

    debug!(
        "Aggregated {} records from {} in {:.3}s ({} makes, {} counties, {} valid ranges)",
        dataset.len(),
        source,
        aggregate_time,
        dataset.metrics.makes.len(),
        dataset.metrics.counties.len(),
        dataset.metrics.electric_range.samples
    );

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        records_processed: dataset.len(),
        source: source.to_string(),
        aggregate_time_seconds: aggregate_time,
    };

    AnalysisResult {
        dataset: Arc::new(dataset),
        metadata,
    }
}

// ── QuickSummary ──────────────────────────────────────────────────────────────

/// One manufacturer in [`QuickSummary::top_makes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeCount {
    pub make: String,
    pub count: u64,
}

/// Compact health-check payload: totals, top five makes, type split and
/// average range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickSummary {
    pub total_vehicles: u64,
    pub top_makes: Vec<MakeCount>,
    pub vehicle_types: BTreeMap<String, u64>,
    pub average_range: u64,
}

impl QuickSummary {
    pub fn from_metrics(metrics: &Metrics) -> Self {
        Self {
            total_vehicles: metrics.total_vehicles,
            top_makes: top_makes(metrics, QUICK_SUMMARY_TOP_MAKES)
                .into_iter()
                .map(|c| MakeCount {
                    make: c.label,
                    count: c.count,
                })
                .collect(),
            vehicle_types: metrics.vehicle_types.clone(),
            average_range: metrics.electric_range.average,
        }
    }
}

// ── DashboardReport ───────────────────────────────────────────────────────────

/// Metrics plus every chart projection, as printed by the summary view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub metadata: AnalysisMetadata,
    #[serde(skip_serializing_if = "FilterCriteria::is_empty")]
    pub filter: FilterCriteria,
    pub metrics: Metrics,
    pub top_makes: Vec<CategoryCount>,
    pub vehicle_types: Vec<CategoryCount>,
    pub model_year_trend: Vec<CategoryCount>,
    pub range_distribution: Vec<CategoryCount>,
    pub county_distribution: Vec<CategoryCount>,
    pub cafv_eligibility: Vec<CategoryCount>,
}

impl DashboardReport {
    /// Build the report for `result`, filtered by `criteria`.
    pub fn build(result: &AnalysisResult, criteria: &FilterCriteria, top_n: usize) -> Self {
        let metrics = result.dataset.apply_filter(criteria);
        Self {
            metadata: result.metadata.clone(),
            filter: criteria.clone(),
            top_makes: top_makes(&metrics, top_n),
            vehicle_types: vehicle_type_distribution(&metrics),
            model_year_trend: model_year_trend(&metrics),
            range_distribution: range_distribution(&metrics),
            county_distribution: county_distribution(&metrics),
            cafv_eligibility: cafv_distribution(&metrics),
            metrics,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
