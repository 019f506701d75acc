//! Long-term memory log at `longterm/memory.jsonl`, one record per line.
//!
//! Reading is lenient: blank lines, malformed JSON, and lines without a
//! string `text` are skipped instead of failing the whole file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::atomic::write_atomic;
use crate::workspace::Workspace;

/// A single long-term memory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermRecord {
    pub text: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl LongTermRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Map::new(),
        }
    }

    /// Lowercase hex SHA-256 of `text`; the dedup key used by remote sync.
    pub fn content_hash(&self) -> String {
        content_hash(&self.text)
    }
}

/// Row shape handed to the remote sync adapter.
#[derive(Debug, Clone, Serialize)]
pub struct SyncRow {
    pub text: String,
    pub metadata: Map<String, Value>,
    pub content_hash: String,
}

/// Lowercase hex SHA-256 of `text`.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// On-disk line shape, before metadata normalization.
#[derive(Deserialize)]
struct RawRecord {
    text: String,
    #[serde(default)]
    metadata: Value,
}

impl From<RawRecord> for LongTermRecord {
    fn from(raw: RawRecord) -> Self {
        let metadata = match raw.metadata {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".into(), other);
                map
            }
        };
        Self {
            text: raw.text,
            metadata,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LongTermLog {
    path: PathBuf,
}

impl LongTermLog {
    pub fn new(workspace: &Workspace) -> Self {
        Self::at(workspace.longterm_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All parseable records in file order. A missing file yields none.
    pub fn records(&self) -> Result<Vec<LongTermRecord>> {
        let contents = match std::fs::read(&self.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read long-term log {}", self.path.display()))
            }
        };

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawRecord>(line) {
                Ok(raw) => records.push(raw.into()),
                Err(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(
                path = %self.path.display(),
                skipped,
                "skipped malformed long-term lines"
            );
        }
        Ok(records)
    }

    /// Append one record as a JSON line.
    pub fn append(&self, record: &LongTermRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let mut line = serde_json::to_string(record).context("failed to serialize record")?;
        line.push('\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open long-term log {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("failed to append to {}", self.path.display()))?;
        Ok(())
    }

    /// Atomically replace the whole log, as a sync pull does.
    pub fn replace_all(&self, records: &[LongTermRecord]) -> Result<()> {
        let mut out = String::new();
        for record in records {
            out.push_str(&serde_json::to_string(record).context("failed to serialize record")?);
            out.push('\n');
        }
        write_atomic(&self.path, out.as_bytes())?;
        tracing::info!(path = %self.path.display(), count = records.len(), "replaced long-term log");
        Ok(())
    }

    /// Records with non-blank text, trimmed and hashed for upload.
    pub fn sync_rows(&self) -> Result<Vec<SyncRow>> {
        Ok(self
            .records()?
            .into_iter()
            .filter_map(|record| {
                let text = record.text.trim();
                if text.is_empty() {
                    return None;
                }
                Some(SyncRow {
                    content_hash: content_hash(text),
                    text: text.to_string(),
                    metadata: record.metadata,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn log_with(tmp: &TempDir, contents: &str) -> LongTermLog {
        let path = tmp.path().join("memory.jsonl");
        std::fs::write(&path, contents).unwrap();
        LongTermLog::at(path)
    }

    #[test]
    fn missing_file_has_no_records() {
        let tmp = TempDir::new().unwrap();
        let log = LongTermLog::at(tmp.path().join("absent.jsonl"));
        assert!(log.records().unwrap().is_empty());
    }

    #[test]
    fn skips_blank_and_malformed_lines() {
        let tmp = TempDir::new().unwrap();
        let log = log_with(
            &tmp,
            "{\"text\": \"one\", \"metadata\": {\"k\": 1}}\n\n  \nnot json\n{\"text\": 5}\n{\"text\": \"two\"}\n",
        );

        let records = log.records().unwrap();

        let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(records[0].metadata["k"], 1);
        assert!(records[1].metadata.is_empty());
    }

    #[test]
    fn scalar_metadata_is_wrapped() {
        let tmp = TempDir::new().unwrap();
        let log = log_with(&tmp, "{\"text\": \"t\", \"metadata\": \"tag\"}\n");

        let records = log.records().unwrap();
        assert_eq!(records[0].metadata["value"], "tag");
    }

    #[test]
    fn append_then_read_preserves_order() {
        let tmp = TempDir::new().unwrap();
        let log = LongTermLog::at(tmp.path().join("lt").join("memory.jsonl"));

        log.append(&LongTermRecord::new("first")).unwrap();
        log.append(&LongTermRecord::new("second")).unwrap();

        let texts: Vec<String> = log.records().unwrap().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn replace_all_overwrites() {
        let tmp = TempDir::new().unwrap();
        let log = log_with(&tmp, "{\"text\": \"old\"}\n");

        log.replace_all(&[LongTermRecord::new("new")]).unwrap();

        let records = log.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "new");
    }

    #[test]
    fn content_hash_is_sha256_hex() {
        assert_eq!(
            content_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(LongTermRecord::new("abc").content_hash(), content_hash("abc"));
    }

    #[test]
    fn sync_rows_trim_and_drop_blank_text() {
        let tmp = TempDir::new().unwrap();
        let log = log_with(&tmp, "{\"text\": \"  keep me \"}\n{\"text\": \"   \"}\n");

        let rows = log.sync_rows().unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "keep me");
        assert_eq!(rows[0].content_hash, content_hash("keep me"));
    }
}
