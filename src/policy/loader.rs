//! Load bulk records from CSV or JSON

use super::BatchRecord;
use crate::error::Result;
use csv::{Reader, Trim};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Load all records from a CSV file.
///
/// Header names match the record fields (`id`, `sum_assured`, `modal_premium`,
/// `premium_frequency`, `policy_term`, `premium_paying_term`, `calculated_age`).
/// Empty cells load as missing values.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<BatchRecord>> {
    let file = File::open(path)?;
    load_records_from_reader(BufReader::new(file))
}

/// Load CSV records from any reader (e.g., string buffer, network stream)
pub fn load_records_from_reader<R: Read>(reader: R) -> Result<Vec<BatchRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    read_all(&mut csv_reader)
}

fn read_all<R: Read>(reader: &mut Reader<R>) -> Result<Vec<BatchRecord>> {
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: BatchRecord = result?;
        records.push(record);
    }
    Ok(records)
}

/// Load a JSON array of records from a file
pub fn load_records_json<P: AsRef<Path>>(path: P) -> Result<Vec<BatchRecord>> {
    let file = File::open(path)?;
    load_records_json_from_reader(BufReader::new(file))
}

/// Load a JSON array of records from any reader.
///
/// `id` may be a string or a number; a numeric id keeps its JSON text.
pub fn load_records_json_from_reader<R: Read>(reader: R) -> Result<Vec<BatchRecord>> {
    let values: Vec<Value> = serde_json::from_reader(reader)?;
    values.into_iter().map(record_from_json).collect()
}

fn record_from_json(mut value: Value) -> Result<BatchRecord> {
    if let Some(id) = value.get_mut("id") {
        if let Some(text) = id.as_number().map(|n| n.to_string()) {
            *id = Value::String(text);
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Pick the loader from the file extension (`.json`, otherwise CSV)
pub fn load_records_auto<P: AsRef<Path>>(path: P) -> Result<Vec<BatchRecord>> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        load_records_json(path)
    } else {
        load_records(path)
    }
}
