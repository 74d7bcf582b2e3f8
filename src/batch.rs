//! Batch (CSV) geocoding coordination.
//!
//! Builds one [`BatchEntry`] per input row before anything is launched, so
//! the entry table is read-only during the concurrent phase. Responses come
//! back in completion order and are re-associated with their input row via
//! the row-index [`RequestId`] they were launched with.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::client::{GeocodeClient, RequestId};
use crate::error::Result;
use crate::format::AddressFormat;
use crate::output;
use crate::parser;

/// One input row paired with its formatted address and correlation id.
///
/// Built once per batch invocation, read-only afterwards.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    /// Correlation id; the input row index.
    pub id: RequestId,
    /// Fully-qualified address submitted to the geocoder.
    pub address: String,
    /// Original input row: column 0 is the raw address, the remaining
    /// columns are passthrough metadata.
    pub row: Vec<String>,
}

/// Counters describing one finished batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Input rows read from the CSV.
    pub rows_read: usize,
    /// Responses that came back successfully.
    pub responses_received: usize,
    /// Geo records written to the output file.
    pub records_written: usize,
    /// Input rows that ended up with no output row at all, because their
    /// fetch failed or the geocoder matched nothing.
    pub rows_without_results: usize,
}

/// Drives CSV-mode geocoding: read rows, fan out fetches, correlate
/// responses, write the output file.
#[derive(Debug)]
pub struct BatchCoordinator {
    client: GeocodeClient,
    format: AddressFormat,
}

impl BatchCoordinator {
    /// Create a coordinator over the given client and address format.
    pub fn new(client: GeocodeClient, format: AddressFormat) -> Self {
        Self { client, format }
    }

    /// Geocode every row of `input` and write the result rows to `output`.
    ///
    /// Individual fetch failures only drop that address's rows; CSV read or
    /// write failures abort the whole run.
    pub async fn run(&self, input: &Path, output_path: &Path) -> Result<BatchSummary> {
        let rows = read_rows(input)?;
        let entries = build_entries(rows, &self.format);

        let requests = entries
            .iter()
            .map(|entry| (entry.id, entry.address.clone()))
            .collect();
        let completed = self.client.fetch_batch(requests).await;

        let (out_rows, records_per_entry) = collect_rows(&entries, &completed);

        let mut rows_without_results = 0;
        for entry in &entries {
            if records_per_entry[entry.id] == 0 {
                rows_without_results += 1;
                warn!(address = %entry.address, row = entry.id, "no results; row dropped from output");
            }
        }

        output::write_csv(output_path, &out_rows)?;

        let summary = BatchSummary {
            rows_read: entries.len(),
            responses_received: completed.len(),
            records_written: out_rows.len(),
            rows_without_results,
        };
        info!(
            rows_read = summary.rows_read,
            responses_received = summary.responses_received,
            records_written = summary.records_written,
            rows_without_results = summary.rows_without_results,
            "batch finished"
        );
        Ok(summary)
    }
}

/// Read all input rows. The CSV carries no header; rows may have varying
/// widths.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Build one entry per input row, formatting its first column.
///
/// Duplicate formatted addresses are flagged but each keeps its own entry
/// and its own request; nothing is merged or overwritten.
pub fn build_entries(rows: Vec<Vec<String>>, format: &AddressFormat) -> Vec<BatchEntry> {
    let mut first_seen: HashMap<String, RequestId> = HashMap::new();
    let mut entries = Vec::with_capacity(rows.len());

    for (id, row) in rows.into_iter().enumerate() {
        let raw = row.first().map(String::as_str).unwrap_or_default();
        let address = format.format(raw);
        match first_seen.get(&address) {
            Some(&earlier) => {
                warn!(
                    address = %address,
                    rows = ?[earlier, id],
                    "rows format to the same address; both are geocoded separately"
                );
            }
            None => {
                first_seen.insert(address.clone(), id);
            }
        }
        entries.push(BatchEntry { id, address, row });
    }
    entries
}

/// Turn completed responses into output rows, in completion order.
///
/// Returns the rows plus a per-entry record count (indexed by request id),
/// from which the caller can tell which input rows produced nothing.
pub fn collect_rows(
    entries: &[BatchEntry],
    completed: &[(RequestId, Value)],
) -> (Vec<Vec<String>>, Vec<usize>) {
    let mut rows = Vec::new();
    let mut records_per_entry = vec![0usize; entries.len()];

    for (id, payload) in completed {
        // ids are row indexes into `entries`
        let Some(entry) = entries.get(*id) else {
            warn!(id, "response with unknown request id");
            continue;
        };
        for record in parser::parse_response(payload) {
            let mut row = Vec::with_capacity(entry.row.len() + 2);
            row.push(record.coordinate);
            row.push(record.resolved_address);
            row.extend(entry.row.iter().cloned());
            rows.push(row);
            records_per_entry[*id] += 1;
        }
    }

    (rows, records_per_entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn response_for(pos: &str, text: &str) -> Value {
        json!({
            "response": {
                "GeoObjectCollection": {
                    "featureMember": [{
                        "GeoObject": {
                            "metaDataProperty": {
                                "GeocoderMetaData": { "text": text }
                            },
                            "Point": { "pos": pos }
                        }
                    }]
                }
            }
        })
    }

    fn entries_for(rows: &[&[&str]]) -> Vec<BatchEntry> {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect();
        build_entries(rows, &AddressFormat::new())
    }

    #[test]
    fn test_build_entries_assigns_row_indexes() {
        let entries = entries_for(&[&["Lenina 1", "a"], &["Lenina 2", "b"]]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 0);
        assert_eq!(entries[1].id, 1);
        assert_eq!(entries[0].address, "Russia, Kirov Oblast, Kirov, Lenina 1");
        assert_eq!(entries[1].row, vec!["Lenina 2", "b"]);
    }

    #[test]
    fn test_duplicate_addresses_keep_distinct_entries() {
        let entries = entries_for(&[&["Lenina 1", "first"], &["Lenina 1", "second"]]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].address, entries[1].address);
        assert_ne!(entries[0].id, entries[1].id);

        let completed = vec![
            (1, response_for("49.1 58.1", "resolved")),
            (0, response_for("49.1 58.1", "resolved")),
        ];
        let (rows, counts) = collect_rows(&entries, &completed);
        assert_eq!(rows.len(), 2);
        assert_eq!(counts, vec![1, 1]);
        // completion order: row 1's metadata first
        assert_eq!(rows[0][2..], ["Lenina 1", "second"]);
        assert_eq!(rows[1][2..], ["Lenina 1", "first"]);
    }

    #[test]
    fn test_correlation_survives_completion_order() {
        let entries = entries_for(&[&["A st", "meta-a"], &["B st", "meta-b"], &["C st", "meta-c"]]);
        // completion order C, A, B
        let completed = vec![
            (2, response_for("3.0 3.0", "resolved C")),
            (0, response_for("1.0 1.0", "resolved A")),
            (1, response_for("2.0 2.0", "resolved B")),
        ];

        let (rows, counts) = collect_rows(&entries, &completed);
        assert_eq!(counts, vec![1, 1, 1]);
        assert_eq!(rows[0], vec!["3.0 3.0", "resolved C", "C st", "meta-c"]);
        assert_eq!(rows[1], vec!["1.0 1.0", "resolved A", "A st", "meta-a"]);
        assert_eq!(rows[2], vec!["2.0 2.0", "resolved B", "B st", "meta-b"]);
    }

    #[test]
    fn test_failed_fetch_drops_only_that_row() {
        let entries = entries_for(&[&["A st"], &["B st"], &["C st"]]);
        // B's fetch failed and never completed
        let completed = vec![
            (0, response_for("1.0 1.0", "resolved A")),
            (2, response_for("3.0 3.0", "resolved C")),
        ];

        let (rows, counts) = collect_rows(&entries, &completed);
        assert_eq!(rows.len(), 2);
        assert_eq!(counts, vec![1, 0, 1]);
    }

    #[test]
    fn test_multiple_records_per_response() {
        let entries = entries_for(&[&["A st", "meta"]]);
        let payload = json!({
            "response": {
                "GeoObjectCollection": {
                    "featureMember": [
                        {
                            "GeoObject": {
                                "metaDataProperty": { "GeocoderMetaData": { "text": "match 1" } },
                                "Point": { "pos": "1.0 1.0" }
                            }
                        },
                        {
                            "GeoObject": {
                                "metaDataProperty": { "GeocoderMetaData": { "text": "match 2" } },
                                "Point": { "pos": "2.0 2.0" }
                            }
                        }
                    ]
                }
            }
        });

        let (rows, counts) = collect_rows(&entries, &[(0, payload)]);
        assert_eq!(counts, vec![2]);
        assert_eq!(rows[0], vec!["1.0 1.0", "match 1", "A st", "meta"]);
        assert_eq!(rows[1], vec!["2.0 2.0", "match 2", "A st", "meta"]);
    }

    #[test]
    fn test_unknown_request_id_is_skipped() {
        let entries = entries_for(&[&["A st"]]);
        let completed = vec![(7, response_for("1.0 1.0", "resolved"))];
        let (rows, counts) = collect_rows(&entries, &completed);
        assert!(rows.is_empty());
        assert_eq!(counts, vec![0]);
    }

    #[test]
    fn test_read_rows_headerless_and_flexible() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\"Baramzy, Troitskaya 3\",note1").unwrap();
        writeln!(file, "Lenina 1").unwrap();
        writeln!(file, "Lenina 2,a,b,c").unwrap();
        file.flush().unwrap();

        let rows = read_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Baramzy, Troitskaya 3", "note1"]);
        assert_eq!(rows[1], vec!["Lenina 1"]);
        assert_eq!(rows[2], vec!["Lenina 2", "a", "b", "c"]);
    }
}
