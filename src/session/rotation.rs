//! Bounded conversation growth.
//!
//! Once a conversation grows past `max_conversation_turns`, everything but
//! the newest `keep_recent_turns` messages is compressed into the session
//! summary. The full pre-rotation session is archived first, so the archive
//! is the only place the pruned messages survive verbatim.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::SessionConfig;
use crate::session::archive::ArchiveStore;
use crate::session::types::{Message, Session};

/// Rotation thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_conversation_turns: usize,
    pub keep_recent_turns: usize,
    /// Per-message character cap inside the summary.
    pub summary_item_chars: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for RotationPolicy {
    fn from(config: &SessionConfig) -> Self {
        Self {
            max_conversation_turns: config.max_conversation_turns,
            keep_recent_turns: config.keep_recent_turns,
            summary_item_chars: config.summary_item_chars,
        }
    }
}

/// What a rotation did.
#[derive(Debug, Clone, Serialize)]
pub struct RotationReport {
    pub archive_path: PathBuf,
    pub pruned: usize,
    pub kept: usize,
}

#[derive(Debug, Clone)]
pub struct RotationEngine {
    policy: RotationPolicy,
    archives: ArchiveStore,
}

impl RotationEngine {
    pub fn new(policy: RotationPolicy, archives: ArchiveStore) -> Self {
        Self { policy, archives }
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    pub fn archives(&self) -> &ArchiveStore {
        &self.archives
    }

    /// Rotate `session` in place if it exceeds the policy. Persisting the
    /// mutated session is the caller's job.
    ///
    /// The archive is written before any mutation; if it fails, `session` is
    /// left untouched.
    pub fn rotate(&self, session: &mut Session, now: DateTime<Utc>) -> Result<Option<RotationReport>> {
        let len = session.conversation.len();
        if len <= self.policy.max_conversation_turns {
            return Ok(None);
        }

        let archive_path = self.archives.write(session, now)?;

        let overflow = session.conversation.drain_oldest(self.policy.keep_recent_turns);
        let compressed = compress_messages(&overflow, self.policy.summary_item_chars);
        append_summary(&mut session.summary, &compressed, now);

        tracing::info!(
            session_id = %session.session_id,
            pruned = overflow.len(),
            kept = session.conversation.len(),
            archive = %archive_path.display(),
            "rotated session"
        );

        Ok(Some(RotationReport {
            archive_path,
            pruned: overflow.len(),
            kept: session.conversation.len(),
        }))
    }
}

/// One `- role: content` line per message, newlines flattened and content
/// capped at `max_chars` characters.
pub fn compress_messages(messages: &[Message], max_chars: usize) -> String {
    messages
        .iter()
        .map(|m| {
            let flat = m.content.trim().replace("\r\n", " ").replace(['\n', '\r'], " ");
            format!("- {}: {}", m.role, truncate_chars(&flat, max_chars))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Append a timestamped block, separated from existing text by a blank line.
fn append_summary(summary: &mut String, compressed: &str, now: DateTime<Utc>) {
    let header = format!(
        "[Auto summary @ {}]",
        now.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let existing_len = summary.trim_end().len();
    summary.truncate(existing_len);
    if !summary.is_empty() {
        summary.push_str("\n\n");
    }
    summary.push_str(&header);
    summary.push('\n');
    summary.push_str(compressed);
}
