//! CSV serialization of record sets
//!
//! Pure with respect to the destination: everything here writes to any
//! [`std::io::Write`]. Opening files and choosing paths is the shell's job.

use std::io::Write;

use crate::record::Record;
use crate::resource::ResourceType;

/// Union of field names across records, in first-seen order
pub fn collect_headers(records: &[Record]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.to_string());
            }
        }
    }
    headers
}

/// Header for a resource type's output
///
/// Derived from the records; with no records, falls back to the resource
/// type's default columns so the file still carries a header row.
pub fn headers_for(resource: ResourceType, records: &[Record]) -> Vec<String> {
    if records.is_empty() {
        return resource
            .default_columns()
            .iter()
            .map(|c| c.to_string())
            .collect();
    }
    collect_headers(records)
}

/// Cells of one record laid out under `headers`; absent fields are empty
pub fn record_to_row(record: &Record, headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .map(|h| record.get(h).map(|v| v.to_cell()).unwrap_or_default())
        .collect()
}

/// Write a header row and one row per record
///
/// Returns the number of data rows written.
pub fn write_csv<W: Write>(
    writer: W,
    resource: ResourceType,
    records: &[Record],
) -> Result<usize, csv::Error> {
    let headers = headers_for(resource, records);
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    csv_writer.write_record(&headers)?;
    for record in records {
        csv_writer.write_record(record_to_row(record, &headers))?;
    }
    csv_writer.flush()?;

    Ok(records.len())
}
