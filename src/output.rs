//! Result rendering to standard output and CSV.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::parser::GeoRecord;

/// Print records to stdout, one `coordinate;resolved_address` line per
/// record, in parser-emission order.
pub fn print_records(records: &[GeoRecord]) {
    for record in records {
        println!("{};{}", record.coordinate, record.resolved_address);
    }
}

/// Derive the batch output path: `output_<input-filename>` next to the
/// input file.
pub fn output_path_for(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("output_{name}"))
}

/// Write result rows to a CSV file.
///
/// Unlike fetch and parse failures, a write failure here is fatal; there
/// are no partial-success semantics for file I/O.
pub fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_is_prefixed_sibling() {
        assert_eq!(
            output_path_for(Path::new("addresses.csv")),
            PathBuf::from("output_addresses.csv")
        );
        assert_eq!(
            output_path_for(Path::new("/data/in/addresses.csv")),
            PathBuf::from("/data/in/output_addresses.csv")
        );
    }

    #[test]
    fn test_write_csv_quotes_embedded_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![vec![
            "49.63 58.47".to_string(),
            "Russia, Kirov, resolved".to_string(),
            "note1".to_string(),
        ]];

        write_csv(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "49.63 58.47,\"Russia, Kirov, resolved\",note1");
    }
}
