//! Display-ready views derived from [`Metrics`].
//!
//! Every projection borrows the metrics and returns a fresh list of
//! [`CategoryCount`]s; nothing here mutates its input.

use std::collections::BTreeMap;

use ev_core::models::{CategoryCount, FilterField, Metrics};
use serde::Serialize;

/// Default number of manufacturers in the top-makes view.
pub const DEFAULT_TOP_MAKES: usize = 10;

/// Manufacturers by registration count, descending, at most `limit` entries.
///
/// Equal counts keep ascending label order.
pub fn top_makes(metrics: &Metrics, limit: usize) -> Vec<CategoryCount> {
    let mut makes = by_count_desc(&metrics.makes);
    makes.truncate(limit);
    makes
}

/// Every vehicle type with its count, in label order.
pub fn vehicle_type_distribution(metrics: &Metrics) -> Vec<CategoryCount> {
    in_label_order(&metrics.vehicle_types)
}

/// Registrations per model year, ascending by year label.
pub fn model_year_trend(metrics: &Metrics) -> Vec<CategoryCount> {
    in_label_order(&metrics.model_years)
}

/// Range buckets ordered by their numeric lower bound.
///
/// `"50-99"` comes before `"100-149"`.  Labels that do not start with a
/// number sort after all numeric buckets.
pub fn range_distribution(metrics: &Metrics) -> Vec<CategoryCount> {
    let mut buckets = in_label_order(&metrics.electric_range.distribution);
    buckets.sort_by_key(|b| bucket_low_bound(&b.label).unwrap_or(u64::MAX));
    buckets
}

/// Counties by registration count, descending.
pub fn county_distribution(metrics: &Metrics) -> Vec<CategoryCount> {
    by_count_desc(&metrics.counties)
}

/// CAFV eligibility categories by count, descending.
pub fn cafv_distribution(metrics: &Metrics) -> Vec<CategoryCount> {
    by_count_desc(&metrics.cafv_eligibility)
}

fn bucket_low_bound(label: &str) -> Option<u64> {
    label.split('-').next()?.trim().parse().ok()
}

fn in_label_order(map: &BTreeMap<String, u64>) -> Vec<CategoryCount> {
    map.iter()
        .map(|(label, count)| CategoryCount::new(label.clone(), *count))
        .collect()
}

fn by_count_desc(map: &BTreeMap<String, u64>) -> Vec<CategoryCount> {
    let mut entries = in_label_order(map);
    // Stable sort keeps the map's label order among equal counts.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

// ── FilterOptions ─────────────────────────────────────────────────────────────

/// Sorted option lists offered by the filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub makes: Vec<String>,
    pub vehicle_types: Vec<String>,
    pub counties: Vec<String>,
    pub model_years: Vec<String>,
}

impl FilterOptions {
    /// Options for a single field.
    pub fn for_field(&self, field: FilterField) -> &[String] {
        match field {
            FilterField::Make => &self.makes,
            FilterField::VehicleType => &self.vehicle_types,
            FilterField::County => &self.counties,
            FilterField::ModelYear => &self.model_years,
        }
    }
}

/// Collect the option lists from (normally unfiltered) `metrics`.
pub fn filter_options(metrics: &Metrics) -> FilterOptions {
    let labels = |field: FilterField| -> Vec<String> {
        metrics.category(field).keys().cloned().collect()
    };
    FilterOptions {
        makes: labels(FilterField::Make),
        vehicle_types: labels(FilterField::VehicleType),
        counties: labels(FilterField::County),
        model_years: labels(FilterField::ModelYear),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn labels(list: &[CategoryCount]) -> Vec<&str> {
        list.iter().map(|c| c.label.as_str()).collect()
    }

    fn sample_metrics() -> Metrics {
        let mut metrics = Metrics {
            total_vehicles: 20,
            makes: counts(&[
                ("TESLA", 9),
                ("NISSAN", 3),
                ("KIA", 3),
                ("BMW", 1),
                ("FORD", 4),
            ]),
            vehicle_types: counts(&[
                ("Battery Electric Vehicle (BEV)", 15),
                ("Plug-in Hybrid Electric Vehicle (PHEV)", 5),
            ]),
            model_years: counts(&[("2022", 6), ("2013", 2), ("2020", 12)]),
            counties: counts(&[("King", 12), ("Pierce", 3), ("Snohomish", 5)]),
            cafv_eligibility: counts(&[
                ("Clean Alternative Fuel Vehicle Eligible", 11),
                ("Not eligible due to low battery range", 4),
                ("Eligibility unknown as battery range has not been researched", 5),
            ]),
            ..Default::default()
        };
        metrics.electric_range.distribution = counts(&[
            ("100-149", 2),
            ("50-99", 4),
            ("200-249", 7),
            ("0-49", 5),
            ("1000-1049", 1),
        ]);
        metrics.years = metrics.model_years.keys().cloned().collect();
        metrics
    }

    // ── top_makes ─────────────────────────────────────────────────────────────

    #[test]
    fn test_top_makes_sorted_desc_with_label_tiebreak() {
        let top = top_makes(&sample_metrics(), DEFAULT_TOP_MAKES);
        assert_eq!(labels(&top), vec!["TESLA", "FORD", "KIA", "NISSAN", "BMW"]);
        assert_eq!(top[0].count, 9);
    }

    #[test]
    fn test_top_makes_truncates() {
        let top = top_makes(&sample_metrics(), 2);
        assert_eq!(labels(&top), vec!["TESLA", "FORD"]);
        assert!(top_makes(&sample_metrics(), 0).is_empty());
    }

    #[test]
    fn test_top_makes_does_not_mutate() {
        let metrics = sample_metrics();
        let before = metrics.clone();
        let _ = top_makes(&metrics, 1);
        let _ = county_distribution(&metrics);
        assert_eq!(metrics, before);
    }

    // ── distributions ─────────────────────────────────────────────────────────

    #[test]
    fn test_vehicle_type_distribution_all_entries() {
        let dist = vehicle_type_distribution(&sample_metrics());
        assert_eq!(dist.len(), 2);
        assert_eq!(dist.iter().map(|c| c.count).sum::<u64>(), 20);
    }

    #[test]
    fn test_model_year_trend_ascending() {
        let trend = model_year_trend(&sample_metrics());
        assert_eq!(labels(&trend), vec!["2013", "2020", "2022"]);
        assert_eq!(trend[1].count, 12);
    }

    #[test]
    fn test_range_distribution_numeric_order() {
        let dist = range_distribution(&sample_metrics());
        assert_eq!(
            labels(&dist),
            vec!["0-49", "50-99", "100-149", "200-249", "1000-1049"]
        );
    }

    #[test]
    fn test_range_distribution_non_numeric_label_last() {
        let mut metrics = Metrics::default();
        metrics.electric_range.distribution = counts(&[("other", 1), ("50-99", 2)]);
        assert_eq!(labels(&range_distribution(&metrics)), vec!["50-99", "other"]);
    }

    #[test]
    fn test_county_distribution_desc() {
        let dist = county_distribution(&sample_metrics());
        assert_eq!(labels(&dist), vec!["King", "Snohomish", "Pierce"]);
    }

    #[test]
    fn test_cafv_distribution_desc() {
        let dist = cafv_distribution(&sample_metrics());
        assert_eq!(dist[0].label, "Clean Alternative Fuel Vehicle Eligible");
        assert_eq!(dist.len(), 3);
    }

    #[test]
    fn test_projections_on_empty_metrics() {
        let metrics = Metrics::default();
        assert!(top_makes(&metrics, 10).is_empty());
        assert!(vehicle_type_distribution(&metrics).is_empty());
        assert!(model_year_trend(&metrics).is_empty());
        assert!(range_distribution(&metrics).is_empty());
        assert!(county_distribution(&metrics).is_empty());
    }

    // ── filter_options ────────────────────────────────────────────────────────

    #[test]
    fn test_filter_options_sorted() {
        let options = filter_options(&sample_metrics());
        assert_eq!(options.makes, vec!["BMW", "FORD", "KIA", "NISSAN", "TESLA"]);
        assert_eq!(options.counties, vec!["King", "Pierce", "Snohomish"]);
        assert_eq!(options.model_years, vec!["2013", "2020", "2022"]);
        assert_eq!(options.for_field(FilterField::VehicleType).len(), 2);
    }
}
