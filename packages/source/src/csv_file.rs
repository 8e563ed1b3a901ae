//! CSV reader for the legacy tabular export.
//!
//! Every row becomes a [`RawFeature::Row`] keyed by the trimmed header
//! names, with every cell kept as a trimmed JSON string. Short rows are
//! padded with empty strings.

use serde_json::{Map, Value};

use crate::{RawFeature, SourceError};

/// Parses CSV bytes with a header row into raw features.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if the CSV is unreadable, or
/// [`SourceError::Format`] if there is no header row.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<RawFeature>, SourceError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(SourceError::Format {
            message: "CSV file contains no header row".to_owned(),
        });
    }

    let mut rows = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::debug!("Skipping unreadable CSV row {}: {e}", index + 1);
                continue;
            }
        };

        let mut map = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or("").trim().to_owned();
            map.insert(header.clone(), Value::String(value));
        }
        rows.push(RawFeature::Row(map));
    }

    log::debug!("Parsed {} CSV rows", rows.len());

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_keyed_by_header() {
        let bytes = b"latitude, longitude ,Speed Limit\n30.2,-97.7,35\n30.3,-97.8\n";
        let rows = parse_rows(bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].property("longitude"), Some(&Value::from("-97.7")));
        assert_eq!(rows[0].property("Speed Limit"), Some(&Value::from("35")));
        assert_eq!(rows[1].property("Speed Limit"), Some(&Value::from("")));
    }

    #[test]
    fn strips_byte_order_mark_from_first_header() {
        let bytes = "\u{feff}latitude,longitude\n1,2\n".as_bytes();
        let rows = parse_rows(bytes).unwrap();
        assert_eq!(rows[0].property("latitude"), Some(&Value::from("1")));
    }

    #[test]
    fn empty_input_has_no_rows() {
        assert!(matches!(parse_rows(b""), Err(SourceError::Format { .. })));
    }
}
