// 📂 Record Input - JSON and CSV batches for the CLI and server
// CSV headers become field names; empty cells are left out so aliases apply.

use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::record::ReceiptRecord;

/// Accepts `[{...}, ...]` or `{"records": [{...}, ...]}`.
pub fn records_from_value(value: Value) -> Result<Vec<ReceiptRecord>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("records") {
            Some(Value::Array(items)) => items,
            _ => return Err(anyhow!("Expected a JSON array of records or an object with a \"records\" array")),
        },
        _ => return Err(anyhow!("Expected a JSON array of records")),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            ReceiptRecord::try_from(item).map_err(|_| anyhow!("Record {} is not a JSON object", index))
        })
        .collect()
}

pub fn records_from_json(content: &str) -> Result<Vec<ReceiptRecord>> {
    let value: Value = serde_json::from_str(content).context("Failed to parse records JSON")?;
    records_from_value(value)
}

pub fn records_from_csv(content: &str) -> Result<Vec<ReceiptRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let headers = reader.headers().context("Failed to read CSV header")?.clone();

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Failed to read CSV row {}", line + 1))?;
        let mut fields = Map::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if !cell.is_empty() {
                fields.insert(header.to_string(), Value::String(cell.to_string()));
            }
        }
        records.push(ReceiptRecord::from(fields));
    }
    Ok(records)
}

/// Load a batch from disk; `.csv` files are read as CSV, everything else as JSON.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<ReceiptRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file: {:?}", path))?;

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        records_from_csv(&content)
    } else {
        records_from_json(&content)
    }
}

// ============================================================================
// TESTS
// ============================================================================
