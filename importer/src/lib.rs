//! # Portfolio Import - bulk property import for ENERGY STAR Portfolio Manager
//!
//! Reads property spreadsheets (CSV), checks them, renders each row as a
//! Portfolio Manager `<property>` document and submits it to the web service,
//! one row at a time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│   Encoder   │────▶│  Importer   │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (row → XML) │     │ (HTTP POST) │
//! └─────────────┘     └──────┬──────┘     └─────────────┘     └──────┬──────┘
//!                            │                                       │
//!                     ┌──────▼──────┐                         ┌──────▼──────┐
//!                     │  Validator  │                         │   Export    │
//!                     │  (report)   │                         │ (results)   │
//!                     └─────────────┘                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use portfolio_import::{
//!     export_results, validate_csv, ClientConfig, ImportOptions, Importer, PortfolioManagerClient,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = validate_csv("properties.csv");
//!     print!("{}", report);
//!
//!     let client = PortfolioManagerClient::connect(ClientConfig::from_env()?)?;
//!     let importer = Importer::new(client, ImportOptions::default());
//!     let results = importer.import_csv("properties.csv", None);
//!     export_results(&results, "import_results.csv")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Credentials, environments and batch options
//! - [`models`] - Field catalog, property record and result types
//! - [`parser`] - CSV loading with auto-detection
//! - [`encoder`] - Row to `<property>` XML
//! - [`validation`] - Pre-import checks
//! - [`client`] - Portfolio Manager web service client
//! - [`import`] - Sequential batch import
//! - [`export`] - CSV exports
//! - [`logs`] - Structured progress events

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Input
pub mod parser;
pub mod validation;

// Encoding
pub mod encoder;

// Web service
pub mod client;
pub mod import;

// Output
pub mod export;
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ApiError, ConfigError, CsvError, EncodeError, ExportError};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{ClientConfig, Environment, ImportOptions, DEFAULT_DELAY};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    is_known_field,
    AccountInfo,
    ConstructionStatus,
    ImportResult,
    ImportStatus,
    PropertyDetails,
    PropertyLink,
    PropertyRecord,
    Row,
    OPTIONAL_FIELDS,
    REQUIRED_FIELDS,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    load_csv,
    parse_bytes,
    parse_str,
    CsvTable,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{validate_csv, validate_table, ValidationReport};

// =============================================================================
// Re-exports - Encoder
// =============================================================================

pub use encoder::{encode, encode_with, EncodeOptions, NotesMode};

// =============================================================================
// Re-exports - Client and import
// =============================================================================

pub use client::{HttpTransport, PortfolioManagerClient, Transport};
pub use import::{ImportSummary, Importer};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{export_properties, export_results, write_records, write_sample_csv};

// =============================================================================
// Re-exports - Logs
// =============================================================================

pub use logs::{LogBroadcaster, LogEntry, LogLevel};
