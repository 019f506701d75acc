use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use crate::memory::longterm::LongTermLog;
use crate::session::archive::ArchiveStore;
use crate::session::store::SessionStore;

/// Response from session_stats.
#[derive(Debug, Serialize)]
pub struct SessionStats {
    pub workspace: PathBuf,
    pub session_id: String,
    pub last_updated: DateTime<Utc>,
    pub conversation_turns: usize,
    pub summary_chars: usize,
    pub archive_count: usize,
    pub longterm_records: usize,
}

/// Summarize the active session, its archives, and the long-term log.
///
/// Loads the session through the store, so a missing session is created.
pub fn session_stats(
    workspace: PathBuf,
    store: &SessionStore,
    archives: &ArchiveStore,
    longterm: &LongTermLog,
) -> Result<SessionStats> {
    let session = store.load()?;
    let archive_count = archives.list()?.len();
    let longterm_records = longterm.records()?.len();

    Ok(SessionStats {
        workspace,
        session_id: session.session_id,
        last_updated: session.last_updated,
        conversation_turns: session.conversation.len(),
        summary_chars: session.summary.chars().count(),
        archive_count,
        longterm_records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::Workspace;
    use tempfile::TempDir;

    #[test]
    fn stats_on_fresh_workspace() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());

        let stats = session_stats(
            ws.root().to_path_buf(),
            &SessionStore::new(&ws),
            &ArchiveStore::new(&ws),
            &LongTermLog::new(&ws),
        )
        .unwrap();

        assert_eq!(stats.conversation_turns, 0);
        assert_eq!(stats.summary_chars, 0);
        assert_eq!(stats.archive_count, 0);
        assert_eq!(stats.longterm_records, 0);
        assert!(stats.session_id.ends_with("-default"));
    }
}
