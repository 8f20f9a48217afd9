//! Text coercion rules for CSV cells.
//!
//! Every field goes through exactly one of these readers. A trimmed empty
//! cell is absent. Only required text can fail; a typed optional cell that
//! does not parse falls back to absent or to its default.

use crate::error::{EncodeError, EncodeResult};
use crate::models::Row;

/// Trimmed text, `None` when the column is missing or the cell is empty.
pub fn text(row: &Row, field: &str) -> Option<String> {
    row.get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Text that must be present.
pub fn required_text(row: &Row, field: &str) -> EncodeResult<String> {
    text(row, field).ok_or_else(|| EncodeError::MissingField(field.to_string()))
}

/// Text with a literal fallback.
pub fn text_or(row: &Row, field: &str, default: &str) -> String {
    text(row, field).unwrap_or_else(|| default.to_string())
}

/// Parse a boolean cell (`true/false`, `yes/no`, `1/0`, any case).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

pub fn boolean(row: &Row, field: &str) -> Option<bool> {
    text(row, field).and_then(|v| parse_bool(&v))
}

pub fn boolean_or(row: &Row, field: &str, default: bool) -> bool {
    boolean(row, field).unwrap_or(default)
}

/// Whole number. Spreadsheet exports often write `2005.0`, which is accepted.
pub fn integer(row: &Row, field: &str) -> Option<i64> {
    let value = text(row, field)?;

    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }

    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(f as i64),
        _ => None,
    }
}

/// Decimal within an inclusive range, returned as the source text.
pub fn number_in_range(row: &Row, field: &str, min: f64, max: f64) -> Option<String> {
    let value = text(row, field)?;

    match value.parse::<f64>() {
        Ok(f) if (min..=max).contains(&f) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_blank_cell_is_absent() {
        let r = row(&[("notes", "   ")]);
        assert_eq!(text(&r, "notes"), None);
        assert_eq!(text(&r, "missing"), None);
        assert!(matches!(required_text(&r, "notes"), Err(EncodeError::MissingField(f)) if f == "notes"));
    }

    #[test]
    fn test_booleans() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("No"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);

        let r = row(&[("isFederalProperty", "maybe")]);
        assert_eq!(boolean(&r, "isFederalProperty"), None);
        assert!(!boolean_or(&r, "isFederalProperty", false));
        assert!(boolean_or(&row(&[("gfaTemporary", "Yes")]), "gfaTemporary", false));
    }

    #[test]
    fn test_integer_accepts_float_form() {
        let r = row(&[("yearBuilt", "2005.0")]);
        assert_eq!(integer(&r, "yearBuilt"), Some(2005));

        let r = row(&[("yearBuilt", "1998")]);
        assert_eq!(integer(&r, "yearBuilt"), Some(1998));
    }

    #[test]
    fn test_unparseable_integer_is_absent() {
        assert_eq!(integer(&row(&[("yearBuilt", "2005.5")]), "yearBuilt"), None);
        assert_eq!(integer(&row(&[("yearBuilt", "unknown")]), "yearBuilt"), None);
    }

    #[test]
    fn test_range() {
        let r = row(&[("occupancyPercentage", "85")]);
        assert_eq!(number_in_range(&r, "occupancyPercentage", 0.0, 100.0).as_deref(), Some("85"));

        let r = row(&[("occupancyPercentage", "85.50")]);
        assert_eq!(number_in_range(&r, "occupancyPercentage", 0.0, 100.0).as_deref(), Some("85.50"));

        let r = row(&[("occupancyPercentage", "120")]);
        assert_eq!(number_in_range(&r, "occupancyPercentage", 0.0, 100.0), None);

        let r = row(&[("occupancyPercentage", "most")]);
        assert_eq!(number_in_range(&r, "occupancyPercentage", 0.0, 100.0), None);
    }
}
