/// Format a count with thousands separators.
///
/// # Examples
///
/// ```
/// use ev_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(999), "999");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a range in miles, e.g. `"239 miles"`.
///
/// # Examples
///
/// ```
/// use ev_core::formatting::format_miles;
///
/// assert_eq!(format_miles(239), "239 miles");
/// assert_eq!(format_miles(1_000), "1,000 miles");
/// ```
pub fn format_miles(miles: u64) -> String {
    format!("{} miles", format_count(miles))
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero.
///
/// # Examples
///
/// ```
/// use ev_core::formatting::percentage;
///
/// assert!((percentage(50, 200, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(3, 0, 2), 0.0);
/// ```
pub fn percentage(part: u64, whole: u64, decimal_places: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = (part as f64 / whole as f64) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = s.len() % 3;
    for (i, c) in s.chars().enumerate() {
        if i != 0 && i % 3 == remainder {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
