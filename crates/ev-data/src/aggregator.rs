//! Single-pass aggregation of vehicle records into [`Metrics`].
//!
//! Every record counts toward the total and each categorical tally, with
//! missing fields tallied as `"Unknown"`.  Range statistics only see records
//! whose range parses to a positive integer.

use std::collections::BTreeMap;

use ev_core::models::{Metrics, RangeStats, VehicleRecord};

/// Width of one electric-range bucket in miles.
pub const RANGE_BUCKET_WIDTH: u64 = 50;

// ── Range parsing ─────────────────────────────────────────────────────────────

/// Parse an electric-range cell with leading-integer semantics.
///
/// Leading whitespace and an optional sign are accepted, then decimal digits;
/// anything after the digits is ignored.  Returns `None` for unparsable,
/// zero, negative or overflowing values.
///
/// ```
/// use ev_data::aggregator::parse_range;
///
/// assert_eq!(parse_range("220"), Some(220));
/// assert_eq!(parse_range(" 220.7 mi"), Some(220));
/// assert_eq!(parse_range("0"), None);
/// assert_eq!(parse_range("n/a"), None);
/// ```
pub fn parse_range(raw: &str) -> Option<u64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: u64 = 0;
    let mut seen_digit = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen_digit = true;
        value = value.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
    }

    if !seen_digit || negative || value == 0 {
        return None;
    }
    Some(value)
}

/// Label of the 50-mile bucket containing `miles`, e.g. `"200-249"`.
pub fn range_bucket_label(miles: u64) -> String {
    let low = (miles / RANGE_BUCKET_WIDTH) * RANGE_BUCKET_WIDTH;
    format!("{}-{}", low, low.saturating_add(RANGE_BUCKET_WIDTH - 1))
}

// ── RangeAccumulator ──────────────────────────────────────────────────────────

/// Running range statistics over valid (positive) ranges.
#[derive(Debug, Clone, Default)]
struct RangeAccumulator {
    sum: u128,
    count: u64,
    min: Option<u64>,
    max: u64,
    distribution: BTreeMap<String, u64>,
}

impl RangeAccumulator {
    fn add(&mut self, miles: u64) {
        self.sum += u128::from(miles);
        self.count += 1;
        self.min = Some(self.min.map_or(miles, |m| m.min(miles)));
        self.max = self.max.max(miles);
        *self
            .distribution
            .entry(range_bucket_label(miles))
            .or_insert(0) += 1;
    }

    fn finish(self) -> RangeStats {
        let average = if self.count == 0 {
            0
        } else {
            // Round half up.
            let n = u128::from(self.count);
            ((self.sum * 2 + n) / (n * 2)) as u64
        };

        RangeStats {
            average,
            max: self.max,
            min: self.min.unwrap_or(0),
            distribution: self.distribution,
            samples: self.count,
        }
    }
}

// ── MetricsAggregator ─────────────────────────────────────────────────────────

/// Accumulates records one at a time; call [`finish`](Self::finish) to get
/// the resulting [`Metrics`].
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    total_vehicles: u64,
    vehicle_types: BTreeMap<String, u64>,
    makes: BTreeMap<String, u64>,
    model_years: BTreeMap<String, u64>,
    counties: BTreeMap<String, u64>,
    cafv_eligibility: BTreeMap<String, u64>,
    range: RangeAccumulator,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single record to the running tallies.
    pub fn add_record(&mut self, record: &VehicleRecord) {
        self.total_vehicles += 1;

        tally(&mut self.makes, record.make());
        tally(&mut self.vehicle_types, record.vehicle_type());
        tally(&mut self.model_years, record.model_year());
        tally(&mut self.counties, record.county());
        tally(&mut self.cafv_eligibility, record.cafv_eligibility());

        if let Some(miles) = record.electric_range_raw().and_then(parse_range) {
            self.range.add(miles);
        }
    }

    pub fn finish(self) -> Metrics {
        let years = self.model_years.keys().cloned().collect();
        Metrics {
            total_vehicles: self.total_vehicles,
            vehicle_types: self.vehicle_types,
            makes: self.makes,
            model_years: self.model_years,
            electric_range: self.range.finish(),
            counties: self.counties,
            cafv_eligibility: self.cafv_eligibility,
            years,
        }
    }
}

fn tally(map: &mut BTreeMap<String, u64>, label: &str) {
    match map.get_mut(label) {
        Some(count) => *count += 1,
        None => {
            map.insert(label.to_string(), 1);
        }
    }
}

/// Aggregate `records` into a fresh [`Metrics`].
///
/// Accepts any iterator of record references, so both a full table and a
/// filtered subset can be passed without copying.
pub fn aggregate<'a, I>(records: I) -> Metrics
where
    I: IntoIterator<Item = &'a VehicleRecord>,
{
    let mut aggregator = MetricsAggregator::new();
    for record in records {
        aggregator.add_record(record);
    }
    aggregator.finish()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ev_core::models::UNKNOWN;

    fn rec(make: &str, vtype: &str, year: &str, range: &str, county: &str) -> VehicleRecord {
        VehicleRecord::new(make, vtype, year, range, county)
    }

    fn fleet() -> Vec<VehicleRecord> {
        vec![
            rec("TESLA", "BEV", "2020", "220", "King"),
            rec("NISSAN", "BEV", "2018", "0", "King"),
            rec("TESLA", "BEV", "2022", "", "Pierce"),
            rec("KIA", "PHEV", "2020", "26", "Snohomish"),
            rec("CHEVROLET", "BEV", "2017", "238", "King"),
        ]
    }

    // ── parse_range ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_range_plain() {
        assert_eq!(parse_range("220"), Some(220));
        assert_eq!(parse_range("1"), Some(1));
    }

    #[test]
    fn test_parse_range_leading_integer() {
        assert_eq!(parse_range("220.7"), Some(220));
        assert_eq!(parse_range("220 mi"), Some(220));
        assert_eq!(parse_range("  84"), Some(84));
        assert_eq!(parse_range("+42"), Some(42));
        assert_eq!(parse_range("007"), Some(7));
    }

    #[test]
    fn test_parse_range_invalid() {
        assert_eq!(parse_range(""), None);
        assert_eq!(parse_range("abc"), None);
        assert_eq!(parse_range("mi 220"), None);
        assert_eq!(parse_range("-"), None);
        assert_eq!(parse_range(".5"), None);
    }

    #[test]
    fn test_parse_range_non_positive() {
        assert_eq!(parse_range("0"), None);
        assert_eq!(parse_range("-10"), None);
        assert_eq!(parse_range("-0"), None);
    }

    #[test]
    fn test_parse_range_overflow() {
        assert_eq!(parse_range("99999999999999999999999"), None);
    }

    #[test]
    fn test_aggregate_huge_range_does_not_abort() {
        let max = u64::MAX.to_string();
        assert_eq!(parse_range(&max), Some(u64::MAX));

        let records = vec![
            rec("TESLA", "BEV", "2020", &max, "King"),
            rec("TESLA", "BEV", "2021", &max, "King"),
        ];
        let metrics = aggregate(&records);
        let range = &metrics.electric_range;
        assert_eq!(range.samples, 2);
        assert_eq!(range.max, u64::MAX);
        assert_eq!(range.average, u64::MAX);
        assert_eq!(
            range.distribution.get("18446744073709551600-18446744073709551615"),
            Some(&2)
        );
    }

    // ── range_bucket_label ────────────────────────────────────────────────────

    #[test]
    fn test_range_bucket_label() {
        assert_eq!(range_bucket_label(1), "0-49");
        assert_eq!(range_bucket_label(49), "0-49");
        assert_eq!(range_bucket_label(50), "50-99");
        assert_eq!(range_bucket_label(220), "200-249");
        assert_eq!(range_bucket_label(337), "300-349");
        assert_eq!(range_bucket_label(1000), "1000-1049");
    }

    #[test]
    fn test_range_bucket_label_top_bucket_saturates() {
        assert_eq!(
            range_bucket_label(u64::MAX),
            "18446744073709551600-18446744073709551615"
        );
    }

    // ── aggregate ─────────────────────────────────────────────────────────────

    #[test]
    fn test_aggregate_worked_example() {
        let records = vec![
            rec("TESLA", "BEV", "2020", "220", "King"),
            rec("NISSAN", "BEV", "2018", "0", "King"),
        ];
        let metrics = aggregate(&records);

        assert_eq!(metrics.total_vehicles, 2);
        assert_eq!(metrics.makes.get("TESLA"), Some(&1));
        assert_eq!(metrics.makes.get("NISSAN"), Some(&1));
        assert_eq!(metrics.makes.len(), 2);
        assert_eq!(metrics.electric_range.average, 220);
        assert_eq!(metrics.electric_range.min, 220);
        assert_eq!(metrics.electric_range.max, 220);
        assert_eq!(metrics.electric_range.samples, 1);
        assert_eq!(metrics.electric_range.distribution.len(), 1);
        assert_eq!(metrics.electric_range.distribution.get("200-249"), Some(&1));
        assert_eq!(metrics.years, vec!["2018".to_string(), "2020".to_string()]);
        assert_eq!(metrics.counties.get("King"), Some(&2));
    }

    #[test]
    fn test_aggregate_missing_make_is_unknown() {
        let record = VehicleRecord {
            make: None,
            ..rec("", "BEV", "2021", "100", "King")
        };
        let metrics = aggregate(std::iter::once(&record));
        assert_eq!(metrics.total_vehicles, 1);
        assert_eq!(metrics.makes.get(UNKNOWN), Some(&1));
        assert_eq!(metrics.makes.len(), 1);
        assert_eq!(metrics.cafv_eligibility.get(UNKNOWN), Some(&1));
    }

    #[test]
    fn test_aggregate_empty() {
        let metrics = aggregate(&Vec::<VehicleRecord>::new());
        assert_eq!(metrics, Metrics::default());
        assert!(metrics.years.is_empty());
    }

    #[test]
    fn test_aggregate_total_matches_input_len() {
        let records = fleet();
        let metrics = aggregate(&records);
        assert_eq!(metrics.total_vehicles, records.len() as u64);
    }

    #[test]
    fn test_aggregate_categories_sum_to_total() {
        let metrics = aggregate(&fleet());
        let total = metrics.total_vehicles;
        for map in [
            &metrics.makes,
            &metrics.vehicle_types,
            &metrics.model_years,
            &metrics.counties,
            &metrics.cafv_eligibility,
        ] {
            assert_eq!(map.values().sum::<u64>(), total);
        }
    }

    #[test]
    fn test_aggregate_range_stats() {
        let metrics = aggregate(&fleet());
        let range = &metrics.electric_range;
        // Valid ranges: 220, 26, 238.
        assert_eq!(range.samples, 3);
        assert_eq!(range.min, 26);
        assert_eq!(range.max, 238);
        // (220 + 26 + 238) / 3 = 161.33 → 161
        assert_eq!(range.average, 161);
        assert_eq!(range.distribution.get("0-49"), Some(&1));
        assert_eq!(range.distribution.get("200-249"), Some(&2));
        assert_eq!(range.distribution.values().sum::<u64>(), range.samples);
    }

    #[test]
    fn test_aggregate_average_rounds_half_up() {
        let records = vec![
            rec("A", "BEV", "2020", "1", "X"),
            rec("B", "BEV", "2020", "2", "X"),
        ];
        assert_eq!(aggregate(&records).electric_range.average, 2);

        let records = vec![
            rec("A", "BEV", "2020", "10", "X"),
            rec("B", "BEV", "2020", "10", "X"),
            rec("C", "BEV", "2020", "11", "X"),
        ];
        // 31 / 3 = 10.33 → 10
        assert_eq!(aggregate(&records).electric_range.average, 10);
    }

    #[test]
    fn test_aggregate_no_valid_ranges_yields_zeros() {
        let records = vec![
            rec("A", "BEV", "2020", "0", "X"),
            rec("B", "BEV", "2020", "", "X"),
            rec("C", "BEV", "2020", "unknown", "X"),
            rec("D", "BEV", "2020", "-5", "X"),
        ];
        let range = aggregate(&records).electric_range;
        assert_eq!(range.average, 0);
        assert_eq!(range.min, 0);
        assert_eq!(range.max, 0);
        assert_eq!(range.samples, 0);
        assert!(range.distribution.is_empty());
    }

    #[test]
    fn test_aggregate_malformed_rows_do_not_abort() {
        let records = vec![
            VehicleRecord::default(),
            rec("", "", "", "garbage", ""),
            rec("TESLA", "BEV", "2020", "300", "King"),
        ];
        let metrics = aggregate(&records);
        assert_eq!(metrics.total_vehicles, 3);
        assert_eq!(metrics.makes.get(UNKNOWN), Some(&2));
        assert_eq!(metrics.model_years.get(UNKNOWN), Some(&2));
        assert_eq!(metrics.electric_range.samples, 1);
        assert_eq!(
            metrics.years,
            vec!["2020".to_string(), UNKNOWN.to_string()]
        );
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let mut records = fleet();
        let forward = aggregate(&records);
        records.reverse();
        assert_eq!(aggregate(&records), forward);
    }

    #[test]
    fn test_aggregator_incremental_matches_batch() {
        let records = fleet();
        let mut aggregator = MetricsAggregator::new();
        for r in &records {
            aggregator.add_record(r);
        }
        assert_eq!(aggregator.finish(), aggregate(&records));
    }
}
