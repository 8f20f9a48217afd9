//! Batch import of CSV rows into a Portfolio Manager account.
//!
//! Rows are submitted strictly one after another, with a pause between two
//! submissions. A failing row produces an error [`ImportResult`] and the
//! batch moves on, so the result list always has one entry per row in input
//! order.
//!
//! # Example
//!
//! ```rust,ignore
//! use portfolio_import::{ClientConfig, ImportOptions, ImportSummary, Importer, PortfolioManagerClient};
//!
//! let client = PortfolioManagerClient::connect(ClientConfig::from_env()?)?;
//! let importer = Importer::new(client, ImportOptions::default());
//!
//! let results = importer.import_csv("properties.csv", None);
//! let summary = ImportSummary::from_results(&results);
//! println!("{} succeeded, {} failed", summary.succeeded, summary.failed);
//! ```

use serde::Serialize;
use std::path::Path;
use std::thread;

use crate::client::{HttpTransport, PortfolioManagerClient, Transport};
use crate::config::ImportOptions;
use crate::encoder::{coerce, encode_with};
use crate::error::ApiError;
use crate::logs::LogBroadcaster;
use crate::models::{ImportResult, Row};
use crate::parser::load_csv;

/// Counts derived from a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl ImportSummary {
    pub fn from_results(results: &[ImportResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }
}

/// Sequential importer bound to one client
pub struct Importer<T: Transport = HttpTransport> {
    client: PortfolioManagerClient<T>,
    options: ImportOptions,
    logs: LogBroadcaster,
}

impl<T: Transport> Importer<T> {
    pub fn new(client: PortfolioManagerClient<T>, options: ImportOptions) -> Self {
        Self::with_logs(client, options, LogBroadcaster::new())
    }

    pub fn with_logs(client: PortfolioManagerClient<T>, options: ImportOptions, logs: LogBroadcaster) -> Self {
        Self { client, options, logs }
    }

    pub fn client(&self) -> &PortfolioManagerClient<T> {
        &self.client
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Progress events of this importer
    pub fn logs(&self) -> &LogBroadcaster {
        &self.logs
    }

    /// Load a CSV file and import every row.
    ///
    /// When `account_id` is `None` it is looked up from the credentials. An
    /// unreadable file or a failed lookup is logged and yields no results.
    pub fn import_csv<P: AsRef<Path>>(&self, path: P, account_id: Option<u64>) -> Vec<ImportResult> {
        let table = match load_csv(path) {
            Ok(table) => table,
            Err(e) => {
                self.logs.error(format!("Error reading CSV file: {}", e));
                return Vec::new();
            }
        };

        let account_id = match account_id {
            Some(id) => id,
            None => match self.client.get_account_id() {
                Ok(id) => id,
                Err(e) => {
                    self.logs.error(format!(
                        "Failed to retrieve account ID. Check credentials and connection. ({})",
                        e
                    ));
                    return Vec::new();
                }
            },
        };

        self.logs.info(format!("Account ID: {}", account_id));
        self.logs.info(format!("Importing {} properties...", table.rows.len()));

        self.import_rows(account_id, &table.rows)
    }

    /// Submit rows in order, one result per row.
    pub fn import_rows(&self, account_id: u64, rows: &[Row]) -> Vec<ImportResult> {
        let total = rows.len();
        let mut results = Vec::with_capacity(total);

        for (idx, row) in rows.iter().enumerate() {
            let name = coerce::text(row, "name");
            self.logs.info(format!(
                "Creating property {}/{}: {}",
                idx + 1,
                total,
                name.as_deref().unwrap_or("Unknown")
            ));

            let result = self.submit(account_id, row, name);
            if result.is_success() {
                let id = result
                    .property_id
                    .map_or_else(|| "unknown".to_string(), |id| id.to_string());
                self.logs.success_indent(format!("Success - Property ID: {}", id), 1);
            } else {
                self.logs.error_indent(format!("Failed - {}", result.message), 1);
            }
            results.push(result);

            // Rate limit between calls only
            if idx + 1 < total && !self.options.delay.is_zero() {
                thread::sleep(self.options.delay);
            }
        }

        results
    }

    fn submit(&self, account_id: u64, row: &Row, name: Option<String>) -> ImportResult {
        let outcome = encode_with(row, &self.options.encode)
            .map_err(ApiError::from)
            .and_then(|xml| self.client.create_property(account_id, xml));

        match outcome {
            Ok(property_id) => ImportResult::success(name, property_id),
            Err(e) => ImportResult::error(name, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::testing::ScriptedTransport;
    use crate::config::{ClientConfig, Environment};
    use crate::logs::{drain, LogEntry, LogLevel};
    use crate::models::ImportStatus;
    use std::io::Write;
    use std::time::{Duration, Instant};

    const HEADER: &str = "name,primaryFunction,address1,city,state,postalCode,country,grossFloorArea,constructionStatus";

    fn importer(transport: ScriptedTransport, delay: Duration) -> Importer<ScriptedTransport> {
        let config = ClientConfig::new("user", "pass", Environment::Test).with_base_url("http://pm.test/ws");
        let client = PortfolioManagerClient::with_transport(config, transport);
        let options = ImportOptions { delay, ..Default::default() };
        Importer::with_logs(client, options, LogBroadcaster::silent())
    }

    fn row(name: &str) -> Row {
        let values = [
            ("name", name),
            ("primaryFunction", "Office"),
            ("address1", "1 Main St"),
            ("city", "Washington"),
            ("state", "DC"),
            ("postalCode", "20001"),
            ("country", "US"),
            ("grossFloorArea", "50000"),
            ("constructionStatus", "Existing"),
        ];
        values.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn created(id: u64) -> String {
        format!("<response status=\"Ok\"><id>{}</id></response>", id)
    }

    #[test]
    fn test_failure_in_the_middle_keeps_order() {
        let transport = ScriptedTransport::new()
            .respond(201, &created(1))
            .respond(500, "Internal error")
            .respond(201, &created(3));
        let importer = importer(transport, Duration::ZERO);
        let mut rx = importer.logs().subscribe();

        let results = importer.import_rows(7, &[row("A"), row("B"), row("C")]);

        let statuses: Vec<ImportStatus> = results.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![ImportStatus::Success, ImportStatus::Error, ImportStatus::Success]);
        assert_eq!(results[0].property_id, Some(1));
        assert_eq!(results[0].message, "Property created successfully");
        assert_eq!(results[1].property_name.as_deref(), Some("B"));
        assert_eq!(results[1].property_id, None);
        assert_eq!(results[1].message, "Error 500: Internal error");
        assert_eq!(results[2].property_id, Some(3));

        let entries = drain(&mut rx);
        assert_eq!(
            entries,
            vec![
                LogEntry::info("Creating property 1/3: A"),
                LogEntry::success("Success - Property ID: 1").with_indent(1),
                LogEntry::info("Creating property 2/3: B"),
                LogEntry::error("Failed - Error 500: Internal error").with_indent(1),
                LogEntry::info("Creating property 3/3: C"),
                LogEntry::success("Success - Property ID: 3").with_indent(1),
            ]
        );
    }

    #[test]
    fn test_requests_follow_input_order() {
        let transport = ScriptedTransport::new().respond(201, &created(1)).respond(201, &created(2));
        let importer = importer(transport, Duration::ZERO);

        importer.import_rows(9, &[row("First"), row("Second")]);

        let requests = importer.client().transport().requests.borrow();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.url == "http://pm.test/ws/account/9/property"));
        assert!(requests[0].body.as_deref().unwrap().contains("<name>First</name>"));
        assert!(requests[1].body.as_deref().unwrap().contains("<name>Second</name>"));
    }

    #[test]
    fn test_encode_failure_is_not_submitted() {
        let mut incomplete = row("Broken");
        incomplete.remove("city");
        let transport = ScriptedTransport::new().respond(201, &created(2));
        let importer = importer(transport, Duration::ZERO);

        let results = importer.import_rows(7, &[incomplete, row("Fine")]);

        assert_eq!(results.len(), 2);
        assert!(!results[0].is_success());
        assert_eq!(results[0].message, "Invalid record: Missing required field: city");
        assert!(results[1].is_success());
        assert_eq!(importer.client().transport().requests.borrow().len(), 1);
    }

    #[test]
    fn test_transport_failure_becomes_error_result() {
        let transport = ScriptedTransport::new().fail("connection reset");
        let importer = importer(transport, Duration::ZERO);

        let results = importer.import_rows(7, &[row("A")]);
        assert_eq!(results[0].status, ImportStatus::Error);
        assert!(results[0].message.contains("connection reset"));
    }

    #[test]
    fn test_unnamed_row_logged_as_unknown() {
        let mut unnamed = row("");
        unnamed.remove("name");
        let importer = importer(ScriptedTransport::new(), Duration::ZERO);
        let mut rx = importer.logs().subscribe();

        let results = importer.import_rows(7, &[unnamed]);

        assert_eq!(results[0].property_name, None);
        assert_eq!(drain(&mut rx)[0], LogEntry::info("Creating property 1/1: Unknown"));
    }

    #[test]
    fn test_delay_between_calls() {
        let transport = ScriptedTransport::new().respond(201, &created(1)).respond(201, &created(2));
        let importer = importer(transport, Duration::from_millis(200));

        let started = Instant::now();
        importer.import_rows(7, &[row("A"), row("B")]);

        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[test]
    fn test_no_delay_after_last_call() {
        let importer = importer(ScriptedTransport::new().respond(201, &created(1)), Duration::from_secs(30));

        let started = Instant::now();
        let results = importer.import_rows(7, &[row("A")]);

        assert!(results[0].is_success());
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn test_import_csv_resolves_account() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "HQ,Office,1 Main St,Washington,DC,20001,US,50000,Existing").unwrap();

        let transport = ScriptedTransport::new()
            .respond(200, "<account><id>42</id></account>")
            .respond(201, &created(100));
        let importer = importer(transport, Duration::ZERO);
        let mut rx = importer.logs().subscribe();

        let results = importer.import_csv(file.path(), None);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].property_id, Some(100));
        let requests = importer.client().transport().requests.borrow();
        assert_eq!(requests[1].url, "http://pm.test/ws/account/42/property");

        let entries = drain(&mut rx);
        assert_eq!(entries[0], LogEntry::info("Account ID: 42"));
        assert_eq!(entries[1], LogEntry::info("Importing 1 properties..."));
    }

    #[test]
    fn test_import_csv_with_explicit_account() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "HQ,Office,1 Main St,Washington,DC,20001,US,50000,Existing").unwrap();

        let importer = importer(ScriptedTransport::new().respond(201, &created(5)), Duration::ZERO);
        let results = importer.import_csv(file.path(), Some(11));

        assert_eq!(results.len(), 1);
        let requests = importer.client().transport().requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://pm.test/ws/account/11/property");
    }

    #[test]
    fn test_account_lookup_failure_returns_nothing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "HQ,Office,1 Main St,Washington,DC,20001,US,50000,Existing").unwrap();

        let importer = importer(ScriptedTransport::new().respond(401, "Unauthorized"), Duration::ZERO);
        let mut rx = importer.logs().subscribe();

        let results = importer.import_csv(file.path(), None);

        assert!(results.is_empty());
        let entries = drain(&mut rx);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Error);
        assert!(entries[0].message.starts_with("Failed to retrieve account ID"));
    }

    #[test]
    fn test_unreadable_csv_returns_nothing() {
        let importer = importer(ScriptedTransport::new(), Duration::ZERO);
        let mut rx = importer.logs().subscribe();

        let results = importer.import_csv("/no/such/dir/properties.csv", Some(1));

        assert!(results.is_empty());
        assert!(importer.client().transport().requests.borrow().is_empty());
        assert!(drain(&mut rx)[0].message.starts_with("Error reading CSV file:"));
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            ImportResult::success(Some("A".into()), Some(1)),
            ImportResult::error(Some("B".into()), "Error 500: boom"),
            ImportResult::success(Some("C".into()), None),
        ];
        let summary = ImportSummary::from_results(&results);

        assert_eq!(summary, ImportSummary { total: 3, succeeded: 2, failed: 1 });
        assert_eq!(ImportSummary::from_results(&[]), ImportSummary::default());
    }
}
