//! CLI `longterm` commands: append records and dump sync rows.

use anyhow::{Context, Result};
use serde_json::Value;

use memora::config::MemoraConfig;
use memora::memory::longterm::{LongTermLog, LongTermRecord};
use memora::workspace::Workspace;

/// Append one record built from `text` and `key=value` metadata pairs.
pub fn add(config: &MemoraConfig, text: &str, meta: &[String]) -> Result<()> {
    anyhow::ensure!(!text.trim().is_empty(), "long-term record text must not be empty");

    let mut record = LongTermRecord::new(text);
    for pair in meta {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("metadata must be KEY=VALUE, got `{pair}`"))?;
        record
            .metadata
            .insert(key.trim().to_string(), Value::String(value.to_string()));
    }

    let log = LongTermLog::new(&Workspace::from_config(config));
    log.append(&record)?;
    println!("Stored record {}", record.content_hash());
    Ok(())
}

/// Print the rows a remote sync push would upload.
pub fn rows(config: &MemoraConfig) -> Result<()> {
    let log = LongTermLog::new(&Workspace::from_config(config));
    super::print_json(&log.sync_rows()?)
}
