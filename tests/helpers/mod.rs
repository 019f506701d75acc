#![allow(dead_code)]

use memora::config::MemoraConfig;
use memora::memory::longterm::{LongTermLog, LongTermRecord};
use memora::memory::search::{RetrievalIndex, TieBreak};
use memora::session::SessionService;
use memora::workspace::Workspace;
use tempfile::TempDir;

/// A throwaway workspace rooted in a temp dir, with default policy.
pub struct TestWorkspace {
    pub tmp: TempDir,
    pub workspace: Workspace,
    pub config: MemoraConfig,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let mut config = MemoraConfig::default();
        config.workspace.root = tmp.path().join(".memora").to_string_lossy().into_owned();
        let workspace = Workspace::from_config(&config);
        workspace.ensure_layout().unwrap();
        Self {
            tmp,
            workspace,
            config,
        }
    }

    pub fn service(&self) -> SessionService {
        SessionService::from_config(&self.config, &self.workspace)
    }

    pub fn index(&self) -> RetrievalIndex {
        RetrievalIndex::new(LongTermLog::new(&self.workspace), TieBreak::FileOrder)
    }

    /// Write the long-term log, one record per text, in order.
    pub fn write_longterm(&self, texts: &[&str]) {
        let records: Vec<LongTermRecord> = texts.iter().map(|t| LongTermRecord::new(*t)).collect();
        LongTermLog::new(&self.workspace).replace_all(&records).unwrap();
    }

    pub fn archive_files(&self) -> Vec<std::path::PathBuf> {
        self.service().rotation().archives().list().unwrap()
    }
}

/// Alternate user/assistant messages `count` times.
pub fn append_alternating(service: &SessionService, count: usize) {
    for i in 0..count {
        let role = if i % 2 == 0 { "user" } else { "assistant" };
        service.add_message(role, &format!("turn {i}")).unwrap();
    }
}
