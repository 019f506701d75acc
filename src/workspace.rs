//! On-disk layout of a memora workspace.
//!
//! ```text
//! <root>/
//! ├── config.toml
//! ├── core/master_memory.md
//! ├── sessions/
//! │   ├── active_session.json
//! │   ├── active_session.backup.json
//! │   └── archive/<session_id>_<timestamp>.json
//! └── longterm/memory.jsonl
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::MemoraConfig;

/// Seed text written to the core memory file by `memora init`.
pub const DEFAULT_CORE_MEMORY: &str = "# Master Core Memory

This file is always included verbatim in composed prompts.

- Long-term goals of the project
- Development philosophy
- Forbidden patterns
- Architecture principles to keep consistent
";

/// Resolved paths for one workspace root.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &MemoraConfig) -> Self {
        Self::new(config.resolved_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn core_memory_path(&self) -> PathBuf {
        self.root.join("core").join("master_memory.md")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("sessions")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.sessions_dir().join("archive")
    }

    pub fn active_session_path(&self) -> PathBuf {
        self.sessions_dir().join("active_session.json")
    }

    pub fn backup_session_path(&self) -> PathBuf {
        self.sessions_dir().join("active_session.backup.json")
    }

    pub fn longterm_path(&self) -> PathBuf {
        self.root.join("longterm").join("memory.jsonl")
    }

    /// Create every directory of the layout. Safe to call repeatedly.
    pub fn ensure_layout(&self) -> Result<()> {
        for dir in [
            self.root.join("core"),
            self.archive_dir(),
            self.root.join("longterm"),
        ] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }

    /// Write [`DEFAULT_CORE_MEMORY`] if no core memory file exists yet.
    ///
    /// Returns `true` when the file was created.
    pub fn seed_core_memory(&self) -> Result<bool> {
        let path = self.core_memory_path();
        if path.exists() {
            return Ok(false);
        }
        self.ensure_layout()?;
        std::fs::write(&path, DEFAULT_CORE_MEMORY)
            .with_context(|| format!("failed to write core memory {}", path.display()))?;
        tracing::info!(path = %path.display(), "seeded core memory");
        Ok(true)
    }
}
