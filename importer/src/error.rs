//! Error types for the Portfolio Manager import toolkit.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - CSV loading errors
//! - [`EncodeError`] - Row to XML encoding errors
//! - [`ApiError`] - Web service call errors
//! - [`ConfigError`] - Configuration errors
//! - [`ExportError`] - CSV export errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Loading Errors
// =============================================================================

/// Errors while loading a CSV file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),
}

// =============================================================================
// Encoding Errors
// =============================================================================

/// Errors while turning a CSV row into a property XML document.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A required field with no default is absent or empty.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// XML writer failure.
    #[error("XML error: {0}")]
    Xml(String),
}

// =============================================================================
// Web Service Errors
// =============================================================================

/// Errors from calls to the Portfolio Manager web service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be sent or the response could not be read.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Error {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body is not well-formed XML.
    #[error("Invalid XML response: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Expected element missing from the response.
    #[error("Missing element in response: {0}")]
    MissingElement(String),

    /// Element present but its content is unusable.
    #[error("Invalid value for element '{element}': {value}")]
    InvalidValue { element: String, value: String },

    /// The request payload could not be built.
    #[error("Invalid record: {0}")]
    Encode(#[from] EncodeError),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while building the client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing environment variable.
    #[error("Missing {0} environment variable")]
    MissingVar(String),

    /// Environment variable holds an unusable value.
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing CSV exports.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("Export IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record serialization error.
    #[error("Export JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Web service error while gathering data to export.
    #[error("Service error: {0}")]
    Api(#[from] ApiError),

    /// Nothing to export.
    #[error("No properties found")]
    NoProperties,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV loading.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for encoding.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Result type for web service calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for exports.
pub type ExportResult<T> = Result<T, ExportError>;
