//! Row decoding for the EV population dataset.
//!
//! Turns CSV text (header row first) or a JSON array of row objects into
//! [`VehicleRecord`]s.  Decoding is tolerant by construction: unknown columns
//! are ignored, missing columns and short rows leave fields absent, and
//! invalid UTF-8 is replaced.  Only failures of the underlying reader are
//! reported as errors.

use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use ev_core::error::{DashboardError, Result};
use ev_core::models::{columns, VehicleRecord};
use tracing::debug;

// ── Public API ────────────────────────────────────────────────────────────────

/// Decode CSV text into records.
pub fn decode_csv(text: &str) -> Result<Vec<VehicleRecord>> {
    decode_csv_from_reader(text.as_bytes())
}

/// Decode CSV from any byte stream.
pub fn decode_csv_from_reader<R: Read>(reader: R) -> Result<Vec<VehicleRecord>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr.byte_headers().map_err(csv_error)?.clone();
    let layout = ColumnLayout::from_headers(&headers);

    let mut records = Vec::new();
    let mut row = ByteRecord::new();
    let mut skipped = 0usize;
    while rdr.read_byte_record(&mut row).map_err(csv_error)? {
        if is_empty_line(&row) {
            skipped += 1;
            continue;
        }
        records.push(layout.decode(&row));
    }

    debug!(
        "Decoded {} rows ({} empty lines skipped)",
        records.len(),
        skipped
    );
    Ok(records)
}

/// Read and decode the CSV file at `path`.
pub fn load_csv_file(path: &Path) -> Result<Vec<VehicleRecord>> {
    let file = std::fs::File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let records = decode_csv_from_reader(std::io::BufReader::new(file))?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Decode a JSON array of row objects keyed by the CSV column headers.
pub fn decode_json_rows(text: &str) -> Result<Vec<VehicleRecord>> {
    Ok(serde_json::from_str(text)?)
}

// ── Column layout ─────────────────────────────────────────────────────────────

/// Position of each known column in the header row.
#[derive(Debug, Default)]
struct ColumnLayout {
    make: Option<usize>,
    vehicle_type: Option<usize>,
    model_year: Option<usize>,
    electric_range: Option<usize>,
    county: Option<usize>,
    cafv_eligibility: Option<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &ByteRecord) -> Self {
        let names: Vec<String> = headers
            .iter()
            .map(|h| {
                String::from_utf8_lossy(h)
                    .trim_start_matches('\u{feff}')
                    .trim()
                    .to_string()
            })
            .collect();
        let find = |name: &str| names.iter().position(|h| h == name);

        Self {
            make: find(columns::MAKE),
            vehicle_type: find(columns::VEHICLE_TYPE),
            model_year: find(columns::MODEL_YEAR),
            electric_range: find(columns::ELECTRIC_RANGE),
            county: find(columns::COUNTY),
            cafv_eligibility: find(columns::CAFV_ELIGIBILITY),
        }
    }

    fn decode(&self, row: &ByteRecord) -> VehicleRecord {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        };

        VehicleRecord {
            make: cell(self.make),
            vehicle_type: cell(self.vehicle_type),
            model_year: cell(self.model_year),
            electric_range: cell(self.electric_range),
            county: cell(self.county),
            cafv_eligibility: cell(self.cafv_eligibility),
        }
    }
}

/// A line with no content at all.  Whitespace-only lines are rows.
fn is_empty_line(row: &ByteRecord) -> bool {
    row.len() <= 1 && row.iter().all(|f| f.is_empty())
}

fn csv_error(err: csv::Error) -> DashboardError {
    DashboardError::CsvDecode(err.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
