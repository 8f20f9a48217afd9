//! CSV loader with encoding and delimiter auto-detection.
//!
//! Produces a [`CsvTable`] of text rows. No Portfolio Manager logic here.

use std::path::Path;

use crate::error::CsvResult;
use crate::models::Row;

/// Parsed CSV file with metadata
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    /// Column headers in file order
    pub headers: Vec<String>,
    /// Data rows, cells trimmed
    pub rows: Vec<Row>,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
}

impl CsvTable {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Non-empty values of a column, in row order
    pub fn values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows
            .iter()
            .filter_map(move |row| row.get(column))
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        // WHATWG maps the latin1 label onto windows-1252, a superset of its printable range
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        // UTF-8 and anything unknown: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Load a CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let table = load_csv("properties.csv")?;
/// println!("{} rows, columns: {}", table.rows.len(), table.headers.join(", "));
/// ```
pub fn load_csv<P: AsRef<Path>>(path: P) -> CsvResult<CsvTable> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes(bytes: &[u8]) -> CsvResult<CsvTable> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    let mut table = parse_str(&content, delimiter)?;
    table.encoding = encoding;
    Ok(table)
}

/// Parse CSV text with an explicit delimiter.
///
/// Blank lines are skipped, short rows are padded with empty cells and
/// cells beyond the header are ignored.
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    // Unnamed columns keep their position but are not exposed
    let columns: Vec<(usize, String)> = reader
        .headers()?
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.is_empty())
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;

        // Blank line
        if record.len() <= 1 && record.get(0).map_or(true, str::is_empty) {
            continue;
        }

        let row: Row = columns
            .iter()
            .map(|(i, header)| (header.clone(), record.get(*i).unwrap_or("").to_string()))
            .collect();

        rows.push(row);
    }

    Ok(CsvTable {
        headers: columns.into_iter().map(|(_, h)| h).collect(),
        rows,
        encoding: "utf-8".to_string(),
        delimiter,
    })
}
