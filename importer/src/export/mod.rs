//! CSV exports: import reports, existing properties and the sample template.

use serde_json::{Map, Value};
use std::path::Path;

use crate::client::{PortfolioManagerClient, Transport};
use crate::error::{ExportError, ExportResult};
use crate::logs::LogBroadcaster;
use crate::models::ImportResult;

/// Columns of the sample template, in file order
pub const SAMPLE_HEADERS: [&str; 16] = [
    "name",
    "primaryFunction",
    "address1",
    "address2",
    "city",
    "state",
    "postalCode",
    "country",
    "yearBuilt",
    "constructionStatus",
    "grossFloorArea",
    "gfaUnits",
    "gfaTemporary",
    "occupancyPercentage",
    "isFederalProperty",
    "notes",
];

const SAMPLE_ROWS: [[&str; 16]; 3] = [
    [
        "Main Office Building",
        "Office",
        "123 Main Street",
        "Suite 100",
        "Washington",
        "DC",
        "20001",
        "US",
        "2005",
        "Existing",
        "50000",
        "Square Feet",
        "false",
        "85",
        "false",
        "Headquarters building",
    ],
    [
        "Warehouse Facility",
        "Non-Refrigerated Warehouse",
        "456 Industrial Ave",
        "",
        "Baltimore",
        "MD",
        "21201",
        "US",
        "1998",
        "Existing",
        "100000",
        "Square Feet",
        "false",
        "90",
        "false",
        "Distribution center",
    ],
    [
        "Retail Store Downtown",
        "Retail Store",
        "789 Commerce Blvd",
        "Unit 5",
        "Arlington",
        "VA",
        "22201",
        "US",
        "2010",
        "Existing",
        "15000",
        "Square Feet",
        "false",
        "95",
        "false",
        "Flagship store",
    ],
];

/// Write JSON objects as CSV rows.
///
/// Columns are the union of all keys in first-seen order. Missing keys and
/// `null` values become empty cells; non-object records are skipped.
pub fn write_records<P: AsRef<Path>>(path: P, records: &[Value]) -> ExportResult<()> {
    let objects: Vec<&Map<String, Value>> = records.iter().filter_map(Value::as_object).collect();

    let mut columns: Vec<&str> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    if !columns.is_empty() {
        writer.write_record(&columns)?;
        for object in &objects {
            let row: Vec<String> = columns.iter().map(|col| cell(object.get(*col))).collect();
            writer.write_record(&row)?;
        }
    }
    writer.flush()?;

    Ok(())
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Write the import report (status, property_name, property_id, message).
pub fn export_results<P: AsRef<Path>>(results: &[ImportResult], path: P) -> ExportResult<()> {
    let records = results
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    write_records(path, &records)
}

/// Export every property of an account with its details.
///
/// Properties whose details cannot be fetched are logged and left out.
/// Returns the number of rows written.
pub fn export_properties<T, P>(
    client: &PortfolioManagerClient<T>,
    account_id: u64,
    path: P,
    logs: &LogBroadcaster,
) -> ExportResult<usize>
where
    T: Transport,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let links = client.list_properties(account_id)?;
    if links.is_empty() {
        return Err(ExportError::NoProperties);
    }

    logs.info(format!("Found {} properties. Fetching details...", links.len()));

    let mut records = Vec::with_capacity(links.len());
    for (idx, link) in links.iter().enumerate() {
        logs.info_indent(
            format!(
                "Fetching property {}/{}: {}",
                idx + 1,
                links.len(),
                link.name.as_deref().unwrap_or("Unknown")
            ),
            1,
        );

        match client.get_property_details(link.property_id) {
            Ok(details) => {
                let mut record = serde_json::to_value(&details)?;
                if let Value::Object(map) = &mut record {
                    map.insert("property_id".to_string(), Value::from(link.property_id));
                }
                records.push(record);
            }
            Err(e) => logs.error_indent(format!("Skipped property {}: {}", link.property_id, e), 2),
        }
    }

    write_records(path, &records)?;
    logs.success(format!("Exported {} properties to {}", records.len(), path.display()));

    Ok(records.len())
}

/// Write a three-row template with every importable column.
pub fn write_sample_csv<P: AsRef<Path>>(path: P) -> ExportResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(SAMPLE_HEADERS)?;
    for row in &SAMPLE_ROWS {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
