//! Domain models for the import toolkit.
//!
//! - [`Row`] - One raw CSV row (field name -> text)
//! - [`PropertyRecord`] - A row after coercion, ready to encode
//! - [`ConstructionStatus`] - Closed set of construction statuses
//! - [`ImportResult`] - Outcome of one property submission
//! - [`AccountInfo`], [`PropertyLink`], [`PropertyDetails`] - Data read back from the service

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One CSV row keyed by column header. Empty cells mean "absent".
pub type Row = HashMap<String, String>;

// =============================================================================
// Field vocabulary
// =============================================================================

/// Columns every import file must provide.
pub const REQUIRED_FIELDS: [&str; 9] = [
    "name",
    "primaryFunction",
    "address1",
    "city",
    "state",
    "postalCode",
    "country",
    "grossFloorArea",
    "constructionStatus",
];

/// Columns the encoder understands but does not require.
pub const OPTIONAL_FIELDS: [&str; 8] = [
    "address2",
    "yearBuilt",
    "occupancyPercentage",
    "gfaUnits",
    "gfaTemporary",
    "isFederalProperty",
    "notes",
    "isInstitutionalProperty",
];

/// Known property types. The service accepts more than these.
pub const KNOWN_PRIMARY_FUNCTIONS: [&str; 14] = [
    "Office",
    "Bank Branch",
    "Financial Office",
    "K-12 School",
    "College/University",
    "Hospital (General Medical & Surgical)",
    "Medical Office",
    "Hotel",
    "Restaurant",
    "Non-Refrigerated Warehouse",
    "Distribution Center",
    "Data Center",
    "Retail Store",
    "Other",
];

pub const DEFAULT_COUNTRY: &str = "US";
pub const DEFAULT_GFA_UNITS: &str = "Square Feet";

/// The only country where `isInstitutionalProperty` is sent
pub const INSTITUTIONAL_COUNTRY: &str = "CA";

/// Whether a column is read by the encoder
pub fn is_known_field(column: &str) -> bool {
    REQUIRED_FIELDS.contains(&column) || OPTIONAL_FIELDS.contains(&column)
}

// =============================================================================
// Construction Status
// =============================================================================

/// Construction status accepted by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConstructionStatus {
    #[default]
    Existing,
    Project,
    Design,
    Construction,
    Test,
}

impl ConstructionStatus {
    pub const ALL: [ConstructionStatus; 5] = [
        ConstructionStatus::Existing,
        ConstructionStatus::Project,
        ConstructionStatus::Design,
        ConstructionStatus::Construction,
        ConstructionStatus::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConstructionStatus::Existing => "Existing",
            ConstructionStatus::Project => "Project",
            ConstructionStatus::Design => "Design",
            ConstructionStatus::Construction => "Construction",
            ConstructionStatus::Test => "Test",
        }
    }
}

impl fmt::Display for ConstructionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstructionStatus {
    type Err = String;

    /// Exact, case-sensitive match: the service rejects other spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown construction status: {}", s))
    }
}

// =============================================================================
// Property Record
// =============================================================================

/// Street address, emitted as attributes of `<address>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Floor area with its attributes. `value` is the validated source text.
#[derive(Debug, Clone, PartialEq)]
pub struct GrossFloorArea {
    pub value: String,
    pub units: String,
    pub temporary: bool,
}

/// A property ready to be written as XML.
///
/// Built from a [`Row`] by [`PropertyRecord::from_row`]; defaults are
/// already applied, optional fields are `None` when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub name: String,
    pub primary_function: String,
    pub address: Address,
    pub year_built: Option<i64>,
    pub construction_status: String,
    pub gross_floor_area: GrossFloorArea,
    pub occupancy_percentage: Option<String>,
    pub is_federal_property: bool,
    pub notes: Option<String>,
    pub is_institutional_property: Option<bool>,
}

impl PropertyRecord {
    /// Canada-only extension field
    pub fn emits_institutional_flag(&self) -> bool {
        self.address.country == INSTITUTIONAL_COUNTRY && self.is_institutional_property == Some(true)
    }
}

// =============================================================================
// Import Result
// =============================================================================

/// Outcome of a property submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Success,
    Error,
}

/// One row of the import report. Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub status: ImportStatus,
    pub property_name: Option<String>,
    pub property_id: Option<u64>,
    pub message: String,
}

impl ImportResult {
    pub fn success(property_name: Option<String>, property_id: Option<u64>) -> Self {
        Self {
            status: ImportStatus::Success,
            property_name,
            property_id,
            message: "Property created successfully".to_string(),
        }
    }

    pub fn error(property_name: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status: ImportStatus::Error,
            property_name,
            property_id: None,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ImportStatus::Success
    }
}

// =============================================================================
// Read models
// =============================================================================

/// Account of the authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: Option<String>,
    pub username: Option<String>,
    pub webservice_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Entry of a property list response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyLink {
    pub property_id: u64,
    pub name: Option<String>,
    pub link: Option<String>,
}

/// Property read back from the service. Keys match the import columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub construction_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_built: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_floor_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gfa_units: Option<String>,
}
