//! Pre-import checks for property CSV files.
//!
//! Validation is advisory: problems are collected into a
//! [`ValidationReport`], never raised, and an import may run regardless.
//!
//! # Checks
//!
//! 1. Required columns present (one combined error for all missing columns)
//! 2. No empty cells in required columns (one error per column, with a count)
//! 3. `primaryFunction` within the known property types (warning only, the
//!    list is not exhaustive)
//! 4. `constructionStatus` within the closed status set (error)
//!
//! # Example
//!
//! ```rust,ignore
//! use portfolio_import::validate_csv;
//!
//! let report = validate_csv("properties.csv");
//! if !report.valid {
//!     for error in &report.errors {
//!         eprintln!("{}", error);
//!     }
//! }
//! ```

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::models::{ConstructionStatus, KNOWN_PRIMARY_FUNCTIONS, REQUIRED_FIELDS};
use crate::parser::{load_csv, CsvTable};

/// Outcome of validating one CSV file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub total_rows: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Report for a file that could not be read at all
    pub fn unreadable(reason: impl fmt::Display) -> Self {
        Self {
            valid: false,
            total_rows: 0,
            errors: vec![format!("Error reading CSV: {}", reason)],
            warnings: Vec::new(),
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total rows: {}", self.total_rows)?;
        writeln!(f, "Status: {}", if self.valid { "VALID ✓" } else { "INVALID ✗" })?;

        if !self.errors.is_empty() {
            writeln!(f)?;
            writeln!(f, "ERRORS:")?;
            for error in &self.errors {
                writeln!(f, "  ✗ {}", error)?;
            }
        }

        if !self.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "WARNINGS:")?;
            for warning in &self.warnings {
                writeln!(f, "  ⚠ {}", warning)?;
            }
        }

        if self.valid && self.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "✓ CSV file is valid and ready for import!")?;
        }

        Ok(())
    }
}

/// Validate a CSV file on disk.
///
/// Unreadable files produce an invalid report instead of an error.
pub fn validate_csv<P: AsRef<Path>>(path: P) -> ValidationReport {
    match load_csv(path) {
        Ok(table) => validate_table(&table),
        Err(e) => ValidationReport::unreadable(e),
    }
}

/// Validate an already-parsed table.
pub fn validate_table(table: &CsvTable) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Missing columns: reported once, never per row
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|col| !table.has_column(col))
        .collect();
    if !missing.is_empty() {
        errors.push(format!("Missing required columns: {}", missing.join(", ")));
    }

    // Empty cells in present columns
    for col in REQUIRED_FIELDS.iter().copied().filter(|col| table.has_column(col)) {
        let empty_count = table
            .rows
            .iter()
            .filter(|row| row.get(col).map_or(true, |v| v.trim().is_empty()))
            .count();
        if empty_count > 0 {
            errors.push(format!("Column '{}' has {} empty values", col, empty_count));
        }
    }

    let unknown_types = unique_outside(table, "primaryFunction", |v| KNOWN_PRIMARY_FUNCTIONS.contains(&v));
    if !unknown_types.is_empty() {
        warnings.push(format!("Unknown property types (may be valid): {}", unknown_types.join(", ")));
    }

    let bad_statuses = unique_outside(table, "constructionStatus", |v| v.parse::<ConstructionStatus>().is_ok());
    if !bad_statuses.is_empty() {
        errors.push(format!("Invalid construction status values: {}", bad_statuses.join(", ")));
    }

    ValidationReport {
        valid: errors.is_empty(),
        total_rows: table.rows.len(),
        errors,
        warnings,
    }
}

/// Distinct non-empty values of `column` rejected by `accepted`, first-seen order.
fn unique_outside<'a>(table: &'a CsvTable, column: &'a str, accepted: impl Fn(&str) -> bool) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for value in table.values(column) {
        if !accepted(value) && !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use std::io::Write;

    const HEADER: &str = "name,primaryFunction,address1,city,state,postalCode,country,grossFloorArea,constructionStatus";

    fn table(body: &str) -> CsvTable {
        parse_str(&format!("{}\n{}", HEADER, body), ',').unwrap()
    }

    #[test]
    fn test_valid_file() {
        let report = validate_table(&table(
            "HQ,Office,1 Main St,Washington,DC,20001,US,50000,Existing\n\
             Depot,Non-Refrigerated Warehouse,2 Dock Rd,Baltimore,MD,21201,US,100000,Project",
        ));

        assert!(report.valid);
        assert_eq!(report.total_rows, 2);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_city_column() {
        let csv = "name,primaryFunction,address1,state,postalCode,country,grossFloorArea,constructionStatus\n\
                   HQ,Office,1 Main St,DC,20001,US,50000,Existing\n\
                   Annex,Office,2 Main St,DC,20001,US,2000,Existing";
        let report = validate_table(&parse_str(csv, ',').unwrap());

        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Missing required columns: city".to_string()]);
        assert!(!report.errors.iter().any(|e| e.contains("empty values")));
    }

    #[test]
    fn test_missing_columns_combined() {
        let report = validate_table(&parse_str("name,primaryFunction\nHQ,Office", ',').unwrap());

        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0],
            "Missing required columns: address1, city, state, postalCode, country, grossFloorArea, constructionStatus"
        );
    }

    #[test]
    fn test_empty_values_counted_per_column() {
        let report = validate_table(&table(
            "HQ,Office,,Washington,DC,20001,US,,Existing\n\
             ,Office,,Washington,DC,20001,US,300,Existing",
        ));

        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                "Column 'name' has 1 empty values".to_string(),
                "Column 'address1' has 2 empty values".to_string(),
                "Column 'grossFloorArea' has 1 empty values".to_string(),
            ]
        );
    }

    #[test]
    fn test_unknown_construction_status_is_error() {
        let report = validate_table(&table(
            "HQ,Office,1 Main St,Washington,DC,20001,US,50000,Unknown\n\
             B,Office,1 Main St,Washington,DC,20001,US,50000,Unknown",
        ));

        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Invalid construction status values: Unknown".to_string()]);
    }

    #[test]
    fn test_unlisted_property_type_is_warning() {
        let report = validate_table(&table(
            "HQ,Call Center,1 Main St,Washington,DC,20001,US,50000,Existing",
        ));

        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings, vec!["Unknown property types (may be valid): Call Center".to_string()]);
    }

    #[test]
    fn test_empty_enum_cells_only_reported_as_empty() {
        let report = validate_table(&table("HQ,,1 Main St,Washington,DC,20001,US,50000,"));

        assert_eq!(
            report.errors,
            vec![
                "Column 'primaryFunction' has 1 empty values".to_string(),
                "Column 'constructionStatus' has 1 empty values".to_string(),
            ]
        );
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_header_only_file_is_valid() {
        let report = validate_table(&table(""));
        assert!(report.valid);
        assert_eq!(report.total_rows, 0);
    }

    #[test]
    fn test_zero_byte_file_missing_everything() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let report = validate_csv(file.path());

        assert!(!report.valid);
        assert_eq!(report.total_rows, 0);
        assert!(report.errors[0].starts_with("Missing required columns: name, primaryFunction"));
    }

    #[test]
    fn test_unreadable_file() {
        let report = validate_csv("/no/such/dir/properties.csv");

        assert!(!report.valid);
        assert_eq!(report.total_rows, 0);
        assert!(report.errors[0].starts_with("Error reading CSV:"));
    }

    #[test]
    fn test_validate_file_on_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "HQ,Office,\"1 Main St, Suite 2\",Washington,DC,20001,US,50000,Existing").unwrap();

        let report = validate_csv(file.path());
        assert!(report.valid, "{:?}", report.errors);
        assert_eq!(report.total_rows, 1);
    }

    #[test]
    fn test_report_rendering() {
        let report = ValidationReport {
            valid: false,
            total_rows: 3,
            errors: vec!["Missing required columns: city".into()],
            warnings: vec!["Unknown property types (may be valid): Call Center".into()],
        };
        let text = report.to_string();

        assert!(text.contains("Total rows: 3"));
        assert!(text.contains("INVALID"));
        assert!(text.contains("  ✗ Missing required columns: city"));
        assert!(text.contains("  ⚠ Unknown property types"));
        assert!(!text.contains("ready for import"));
    }
}
