use crate::errors::CliError;
use scrape_extract::extraction::FlatRecord;
use serde_json::Value;
use std::path::Path;

/// Renders a record as indented JSON.
pub fn pretty(record: &FlatRecord) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(record)?)
}

/// Renders one CSV cell. Strings are written bare, `null` as an empty cell,
/// and everything else as compact JSON.
#[must_use]
pub fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Writes `record` as a single-row CSV with a header of its keys in order.
pub fn write_csv(path: &Path, record: &FlatRecord) -> Result<(), CliError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(record.keys())?;
    writer.write_record(record.values().map(cell))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(value: Value) -> FlatRecord {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_cells() {
        assert_eq!(cell(&json!("a,b")), "a,b");
        assert_eq!(cell(&json!(null)), "");
        assert_eq!(cell(&json!(3)), "3");
        assert_eq!(cell(&json!(true)), "true");
        assert_eq!(cell(&json!(["x", "y"])), "[\"x\",\"y\"]");
    }

    #[test]
    fn test_csv_has_header_and_one_row() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("output.csv");

        write_csv(
            &path,
            &record(json!({
                "name": "Andover, MA",
                "website": "https://a.example",
                "grades": [9, 12]
            })),
        )
        .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "name,website,grades\n\"Andover, MA\",https://a.example,\"[9,12]\"\n"
        );
    }

    #[test]
    fn test_unwritable_path_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("missing-dir").join("output.csv");

        let err = write_csv(&path, &record(json!({"a": 1}))).unwrap_err();
        assert!(matches!(err, CliError::Csv(_)), "got: {err}");
    }

    #[test]
    fn test_pretty_keeps_key_order() {
        let out = pretty(&record(json!({"z": 1, "a": 2}))).unwrap();
        assert!(out.find("\"z\"").unwrap() < out.find("\"a\"").unwrap());
    }
}
