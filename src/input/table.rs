use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::InputError;
use crate::models::{RawRecord, RawValue};

/// Read every row of the CSV at `path`.
pub fn read_csv(path: &Path) -> Result<Vec<RawRecord>, InputError> {
    let file = std::fs::File::open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_csv_from(file)?;
    debug!(path = %path.display(), rows = records.len(), "read CSV input");
    Ok(records)
}

/// Read CSV from any reader. The first row names the fields.
///
/// A header with no data rows is a valid, empty batch. Empty cells become
/// [`RawValue::Missing`]; everything else stays text for the normalizer.
pub fn read_csv_from<R: Read>(reader: R) -> Result<Vec<RawRecord>, InputError> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(InputError::Parse("file has no header row".to_string()));
    }
    let mut seen = HashSet::with_capacity(headers.len());
    for h in &headers {
        if !seen.insert(h.as_str()) {
            return Err(InputError::DuplicateColumn(h.clone()));
        }
    }

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let mut record = RawRecord::new();
        for (name, cell) in headers.iter().zip(row.iter()) {
            let value = if cell.is_empty() {
                RawValue::Missing
            } else {
                RawValue::Text(cell.to_string())
            };
            record.insert(name.clone(), value);
        }
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_keep_header_order() {
        let data = "customerID,gender,tenure,Contract\n7590-VHVEG,Female,1,Month-to-month\n5575-GNVDE,Male,34,One year\n";
        let records = read_csv_from(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        let names: Vec<&str> = records[1].iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["customerID", "gender", "tenure", "Contract"]);
        assert_eq!(records[1].get("tenure"), Some(&RawValue::Text("34".into())));
    }

    #[test]
    fn test_header_only_is_empty_batch() {
        let records = read_csv_from("customerID,tenure\n".as_bytes()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        assert!(matches!(read_csv_from("".as_bytes()), Err(InputError::Parse(_))));
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let data = "a,b\n1,2\n3\n";
        match read_csv_from(data.as_bytes()) {
            Err(InputError::Parse(msg)) => assert!(msg.contains("fields"), "{}", msg),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let data = "tenure,tenure\n1,2\n";
        assert!(matches!(read_csv_from(data.as_bytes()), Err(InputError::DuplicateColumn(_))));
    }

    #[test]
    fn test_empty_cell_is_missing_and_blank_stays_text() {
        let data = "tenure,TotalCharges\n,\" \"\n";
        let records = read_csv_from(data.as_bytes()).unwrap();
        assert_eq!(records[0].get("tenure"), Some(&RawValue::Missing));
        assert_eq!(records[0].get("TotalCharges"), Some(&RawValue::Text(" ".into())));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_csv(Path::new("/nonexistent/customers.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/customers.csv"));
    }
}
