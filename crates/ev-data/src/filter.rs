//! Record filtering by user-selected criteria.

use ev_core::models::{FilterCriteria, FilterField, VehicleRecord};

/// `true` when `record` satisfies every constrained field of `criteria`.
///
/// Fields are compared by their category label, so `"Unknown"` selects the
/// records whose field is missing.
pub fn matches(record: &VehicleRecord, criteria: &FilterCriteria) -> bool {
    FilterField::ALL.iter().all(|&field| match criteria.get(field) {
        Some(wanted) => record.field(field) == wanted,
        None => true,
    })
}

/// The records matching `criteria`, in input order.
pub fn filter_records<'a>(
    records: &'a [VehicleRecord],
    criteria: &FilterCriteria,
) -> Vec<&'a VehicleRecord> {
    records.iter().filter(|r| matches(r, criteria)).collect()
}
