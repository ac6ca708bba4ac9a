//! Lenient parsing for imported and persisted tabular data
//!
//! Partially corrupt spreadsheets and CSV files are expected input, not a
//! bug: unparseable numbers coerce to zero and unparseable dates drop the
//! row, each visible only as a warning. Strict validation happens at the
//! interactive entry points, never here.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::warn;

/// Parse a monetary or weight value, tolerating currency symbols and
/// thousands separators. Anything unparseable coerces to zero.
pub fn lenient_amount(raw: &str) -> BigDecimal {
    let cleaned = raw.trim().replace(['$', ','], "");
    if cleaned.is_empty() {
        return BigDecimal::from(0);
    }
    match cleaned.parse::<BigDecimal>() {
        Ok(value) => value,
        Err(_) => {
            warn!(raw, "unparseable amount coerced to 0");
            BigDecimal::from(0)
        }
    }
}

/// Parse an integer count; unparseable values coerce to zero.
pub fn lenient_count(raw: &str) -> i64 {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return 0;
    }
    // spreadsheet exports often render counts as "10.0"
    if let Ok(value) = cleaned.parse::<i64>() {
        return value;
    }
    if let Ok(value) = cleaned.parse::<f64>() {
        return value as i64;
    }
    warn!(raw, "unparseable count coerced to 0");
    0
}

/// Parse a date in ISO or day-first form. `None` means the row carrying it
/// should be dropped.
pub fn lenient_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.trim();
    // timestamps like "2024-03-01 00:00:00" keep only the date part
    let date_part = cleaned.split_whitespace().next().unwrap_or("");
    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
            return Some(date);
        }
    }
    warn!(raw, "unparseable date, dropping row");
    None
}

/// Numeric value of a sequence string; non-numeric sequences count as zero
/// when looking for the maximum.
pub fn sequence_value(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(0)
}
