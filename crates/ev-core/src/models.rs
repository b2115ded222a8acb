use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category label substituted for any missing or empty field.
pub const UNKNOWN: &str = "Unknown";

/// Column headers of the Washington State EV population dataset.
///
/// The same names are used as JSON keys when decoded rows travel over HTTP.
pub mod columns {
    pub const MAKE: &str = "Make";
    pub const VEHICLE_TYPE: &str = "Electric Vehicle Type";
    pub const MODEL_YEAR: &str = "Model Year";
    pub const ELECTRIC_RANGE: &str = "Electric Range";
    pub const COUNTY: &str = "County";
    pub const CAFV_ELIGIBILITY: &str = "Clean Alternative Fuel Vehicle (CAFV) Eligibility";
}

// ── VehicleRecord ─────────────────────────────────────────────────────────────

/// One decoded vehicle registration row.
///
/// Fields are kept exactly as decoded; `None` means the cell was absent.
/// Use the accessor methods to get the coerced category label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(
        rename = "Make",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub make: Option<String>,

    #[serde(
        rename = "Electric Vehicle Type",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub vehicle_type: Option<String>,

    #[serde(
        rename = "Model Year",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub model_year: Option<String>,

    /// Raw range cell; parsed leniently during aggregation.
    #[serde(
        rename = "Electric Range",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub electric_range: Option<String>,

    #[serde(
        rename = "County",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub county: Option<String>,

    #[serde(
        rename = "Clean Alternative Fuel Vehicle (CAFV) Eligibility",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub cafv_eligibility: Option<String>,
}

impl VehicleRecord {
    /// Build a record from plain string cells (CAFV eligibility left absent).
    pub fn new(
        make: &str,
        vehicle_type: &str,
        model_year: &str,
        electric_range: &str,
        county: &str,
    ) -> Self {
        Self {
            make: Some(make.to_string()),
            vehicle_type: Some(vehicle_type.to_string()),
            model_year: Some(model_year.to_string()),
            electric_range: Some(electric_range.to_string()),
            county: Some(county.to_string()),
            cafv_eligibility: None,
        }
    }

    /// Set the CAFV eligibility cell.
    pub fn with_cafv(mut self, eligibility: &str) -> Self {
        self.cafv_eligibility = Some(eligibility.to_string());
        self
    }

    pub fn make(&self) -> &str {
        label_or_unknown(&self.make)
    }

    pub fn vehicle_type(&self) -> &str {
        label_or_unknown(&self.vehicle_type)
    }

    pub fn model_year(&self) -> &str {
        label_or_unknown(&self.model_year)
    }

    pub fn county(&self) -> &str {
        label_or_unknown(&self.county)
    }

    pub fn cafv_eligibility(&self) -> &str {
        label_or_unknown(&self.cafv_eligibility)
    }

    /// The raw range cell, if present.
    pub fn electric_range_raw(&self) -> Option<&str> {
        self.electric_range.as_deref()
    }

    /// Category label of `field` for this record.
    pub fn field(&self, field: FilterField) -> &str {
        match field {
            FilterField::Make => self.make(),
            FilterField::VehicleType => self.vehicle_type(),
            FilterField::County => self.county(),
            FilterField::ModelYear => self.model_year(),
        }
    }
}

fn label_or_unknown(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN,
    }
}

/// Accept strings, numbers, booleans and null for any cell.
///
/// Rows produced by other tools sometimes carry the range or model year as a
/// JSON number; they are kept as their decimal text.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

// ── FilterField ───────────────────────────────────────────────────────────────

/// The four record fields a dashboard user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Make,
    VehicleType,
    County,
    ModelYear,
}

impl FilterField {
    /// All fields in display order.
    pub const ALL: [FilterField; 4] = [
        FilterField::Make,
        FilterField::VehicleType,
        FilterField::County,
        FilterField::ModelYear,
    ];

    /// Human-readable name shown next to the filter control.
    pub fn display_name(self) -> &'static str {
        match self {
            FilterField::Make => "Manufacturer",
            FilterField::VehicleType => "Vehicle Type",
            FilterField::County => "County",
            FilterField::ModelYear => "Model Year",
        }
    }

    /// Label of the "no constraint" option.
    pub fn all_label(self) -> &'static str {
        match self {
            FilterField::Make => "All Manufacturers",
            FilterField::VehicleType => "All Vehicle Types",
            FilterField::County => "All Counties",
            FilterField::ModelYear => "All Years",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ── FilterCriteria ────────────────────────────────────────────────────────────

/// User-selected filter.  An absent or empty value places no constraint on
/// its field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_year: Option<String>,
}

impl FilterCriteria {
    pub fn with_make(mut self, make: impl Into<String>) -> Self {
        self.make = Some(make.into());
        self
    }

    pub fn with_vehicle_type(mut self, vehicle_type: impl Into<String>) -> Self {
        self.vehicle_type = Some(vehicle_type.into());
        self
    }

    pub fn with_county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    pub fn with_model_year(mut self, model_year: impl Into<String>) -> Self {
        self.model_year = Some(model_year.into());
        self
    }

    /// The active constraint for `field`, ignoring empty strings.
    pub fn get(&self, field: FilterField) -> Option<&str> {
        let value = match field {
            FilterField::Make => &self.make,
            FilterField::VehicleType => &self.vehicle_type,
            FilterField::County => &self.county,
            FilterField::ModelYear => &self.model_year,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// Replace the constraint for `field`.
    pub fn set(&mut self, field: FilterField, value: Option<String>) {
        let slot = match field {
            FilterField::Make => &mut self.make,
            FilterField::VehicleType => &mut self.vehicle_type,
            FilterField::County => &mut self.county,
            FilterField::ModelYear => &mut self.model_year,
        };
        *slot = value;
    }

    /// `true` when no field is constrained (the identity filter).
    pub fn is_empty(&self) -> bool {
        FilterField::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

// ── Metrics ───────────────────────────────────────────────────────────────────

/// Range statistics over records with a positive parsed range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeStats {
    /// Rounded mean range in miles, `0` when `samples == 0`.
    pub average: u64,
    /// Largest range, `0` when `samples == 0`.
    pub max: u64,
    /// Smallest range, `0` when `samples == 0`.
    pub min: u64,
    /// 50-mile bucket label (`"200-249"`) → count.
    pub distribution: BTreeMap<String, u64>,
    /// Number of records that contributed a valid range.
    #[serde(default)]
    pub samples: u64,
}

/// Aggregate summary over a set of [`VehicleRecord`]s.
///
/// Created fresh by each aggregation; filtering produces a new instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_vehicles: u64,
    pub vehicle_types: BTreeMap<String, u64>,
    pub makes: BTreeMap<String, u64>,
    pub model_years: BTreeMap<String, u64>,
    pub electric_range: RangeStats,
    pub counties: BTreeMap<String, u64>,
    pub cafv_eligibility: BTreeMap<String, u64>,
    /// Distinct model-year labels, ascending.
    pub years: Vec<String>,
}

impl Metrics {
    /// The category tally backing a filterable field.
    pub fn category(&self, field: FilterField) -> &BTreeMap<String, u64> {
        match field {
            FilterField::Make => &self.makes,
            FilterField::VehicleType => &self.vehicle_types,
            FilterField::County => &self.counties,
            FilterField::ModelYear => &self.model_years,
        }
    }
}

// ── CategoryCount ─────────────────────────────────────────────────────────────

/// One `(label, count)` pair produced by a view projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: u64,
}

impl CategoryCount {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
