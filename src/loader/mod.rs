/*
 * NDJSON loader for captured swap records
 */

use crate::models::{Result, SwapRecord};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// Result of loading a capture file. Lines that fail to parse are dropped,
/// but the count is surfaced so callers can tell how much was lost.
#[derive(Debug)]
pub struct LoadReport {
    pub records: Vec<SwapRecord>,
    pub skipped_lines: usize,
}

impl LoadReport {
    #[must_use]
    pub fn into_records(self) -> Vec<SwapRecord> {
        self.records
    }
}

/// Reads one swap record per line from `path`, preserving input order.
/// Lines that fail to parse are dropped, counted, and warned about once.
///
/// `url_filter`, when given, keeps only records whose service URL contains it
/// as a substring.
pub fn load_records(path: &Path, url_filter: Option<&str>) -> Result<LoadReport> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    let mut skipped_lines = 0usize;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<SwapRecord>(&line) {
            Ok(record) => records.push(record),
            Err(_) => skipped_lines += 1,
        }
    }

    if skipped_lines > 0 {
        warn!("skipped {skipped_lines} malformed input lines");
    }

    if let Some(filter) = url_filter {
        records.retain(|r| {
            r.metadata
                .service_url()
                .is_some_and(|url| url.contains(filter))
        });
    }

    Ok(LoadReport { records, skipped_lines })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_lines(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    const GOOD: &str = r#"{"metadata":{"id":"t1","apiURL":"https://a/x","makerToken":"DAI","takerToken":"ETH","side":"sell","fillValue":"100","fillDelay":12,"swapResult":{"gasUsed":1,"boughtAmount":"2","soldAmount":"1","revertData":"0x"}}}"#;

    #[test]
    fn skips_malformed_lines_and_counts_them() {
        let file = write_lines(&[GOOD, "not json", GOOD, "{\"metadata\":{}}"]);
        let report = load_records(file.path(), None).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.skipped_lines, 2);
    }

    #[test]
    fn url_filter_is_a_substring_match() {
        let other = GOOD.replace("https://a/x", "https://b/y");
        let file = write_lines(&[GOOD, &other]);
        let report = load_records(file.path(), Some("//a/")).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(
            report.records[0].metadata.service_url(),
            Some("https://a/x")
        );
    }
}
