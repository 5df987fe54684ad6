//! Loading log records from an exported document store.
//!
//! Three layouts are understood: a JSON array file, a JSONL file with one
//! record per line, and a collection directory holding one JSON document
//! per record.

use crate::models::LogRecord;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Load every record found at `path`.
///
/// Malformed records are skipped with a warning; unreadable files and
/// an unparseable JSON array are errors.
pub fn load_records(path: &Path) -> Result<Vec<LogRecord>> {
    let records = if path.is_dir() {
        load_collection(path)?
    } else {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read log file: {}", path.display()))?;
        parse_records(&content)
            .with_context(|| format!("Failed to parse log file: {}", path.display()))?
    };

    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse a JSON array or JSONL document into records.
pub fn parse_records(content: &str) -> Result<Vec<LogRecord>> {
    let trimmed = content.trim_start();

    if trimmed.starts_with('[') {
        let values: Vec<Value> =
            serde_json::from_str(trimmed).context("Log file is not a valid JSON array")?;
        return Ok(values
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping malformed record #{}: {}", i + 1, e);
                    None
                }
            })
            .collect());
    }

    let mut records = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed line {}: {}", i + 1, e),
        }
    }

    Ok(records)
}

/// Load a directory where each `*.json` file is one record.
///
/// Documents without an `id` take their file stem as id.
fn load_collection(dir: &Path) -> Result<Vec<LogRecord>> {
    let mut records = Vec::new();

    for entry in collection_entries(dir) {
        let path = entry.path();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                continue;
            }
        };

        match serde_json::from_str::<LogRecord>(&content) {
            Ok(mut record) => {
                if record.id.is_empty() {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        record.id = stem.to_string();
                    }
                }
                records.push(record);
            }
            Err(e) => warn!("Skipping malformed document {}: {}", path.display(), e),
        }
    }

    Ok(records)
}

/// JSON documents directly inside `dir`, sorted by file name.
fn collection_entries(dir: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Failed to read directory entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
        })
}

/// Keep only records owned by `user_id`.
pub fn filter_user(records: Vec<LogRecord>, user_id: &str) -> Vec<LogRecord> {
    records
        .into_iter()
        .filter(|r| r.user_id == user_id)
        .collect()
}

/// Change-detection snapshot of a store path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Latest modification time seen.
    pub modified: Option<SystemTime>,
    /// Total size in bytes.
    pub len: u64,
    /// Number of documents (1 for a single file).
    pub documents: usize,
}

/// Compute the fingerprint of a file or collection directory.
pub fn fingerprint(path: &Path) -> Result<Fingerprint> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?;

    if !metadata.is_dir() {
        return Ok(Fingerprint {
            modified: metadata.modified().ok(),
            len: metadata.len(),
            documents: 1,
        });
    }

    let mut print = Fingerprint {
        modified: metadata.modified().ok(),
        len: 0,
        documents: 0,
    };
    for entry in collection_entries(path) {
        if let Ok(meta) = entry.metadata() {
            print.len += meta.len();
            print.modified = print.modified.max(meta.modified().ok());
        }
        print.documents += 1;
    }

    Ok(print)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_json_array() {
        let content = r#"[
            {"id": "a", "date": "2025-10-14", "steps": 1000, "userId": "u1"},
            "not a record",
            {"id": "b", "date": "2025-10-15", "steps": 2000, "userId": "u2"}
        ]"#;

        let records = parse_records(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[1].steps, Some(2000.0));
    }

    #[test]
    fn test_parse_invalid_array_is_error() {
        assert!(parse_records("[{\"id\": ").is_err());
    }

    #[test]
    fn test_parse_jsonl_skips_malformed_lines() {
        let content = "{\"id\": \"a\", \"date\": \"2025-10-14\"}\n\nnot json\n{\"id\": \"b\", \"date\": \"2025-10-15\"}\n";

        let records = parse_records(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "b");
    }

    #[test]
    fn test_load_collection_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("b-doc.json"),
            r#"{"date": "2025-10-15", "sleep": 8, "userId": "u1"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("a-doc.json"),
            r#"{"id": "explicit", "date": "2025-10-14", "sleep": 7, "userId": "u1"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();

        let records = load_records(dir.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "explicit");
        assert_eq!(records[1].id, "b-doc");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_records(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_filter_user() {
        let records = parse_records(
            "{\"id\": \"a\", \"userId\": \"u1\"}\n{\"id\": \"b\", \"userId\": \"u2\"}\n",
        )
        .unwrap();

        let mine = filter_user(records, "u2");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "b");
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("logs.jsonl");
        fs::write(&file, "{}\n").unwrap();
        let before = fingerprint(&file).unwrap();

        fs::write(&file, "{}\n{}\n").unwrap();
        let after = fingerprint(&file).unwrap();

        assert_ne!(before, after);
        assert_eq!(after.documents, 1);

        let collection = fingerprint(dir.path()).unwrap();
        assert_eq!(collection.documents, 0);
    }
}
