//! Active session persistence with one-generation backup.
//!
//! [`SessionStore::load`] never fails on a corrupt session file: it falls back
//! to the backup, then to a fresh session. [`SessionStore::save`] copies the
//! current active file to the backup before committing the new content with
//! an atomic rename. I/O errors always propagate.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};

use crate::atomic::write_atomic;
use crate::session::types::Session;
use crate::workspace::Workspace;

/// Outcome of reading one session file.
#[derive(Debug)]
pub enum SessionRead {
    Loaded(Session),
    Missing,
    Corrupt(serde_json::Error),
}

/// Reads and writes `active_session.json` and its backup.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions_dir: PathBuf,
    active_path: PathBuf,
    backup_path: PathBuf,
}

impl SessionStore {
    pub fn new(workspace: &Workspace) -> Self {
        Self {
            sessions_dir: workspace.sessions_dir(),
            active_path: workspace.active_session_path(),
            backup_path: workspace.backup_session_path(),
        }
    }

    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    pub fn exists(&self) -> bool {
        self.active_path.exists()
    }

    /// Read the active file without any recovery.
    pub fn read_active(&self) -> Result<SessionRead> {
        read_session_file(&self.active_path)
    }

    /// Load the active session, creating or recovering it as needed.
    pub fn load(&self) -> Result<Session> {
        self.ensure_dir()?;

        match self.read_active()? {
            SessionRead::Loaded(session) => Ok(session),
            SessionRead::Missing => {
                let session = Session::new(None);
                self.write_active(&session)?;
                tracing::info!(
                    session_id = %session.session_id,
                    path = %self.active_path.display(),
                    "created default session"
                );
                Ok(session)
            }
            SessionRead::Corrupt(err) => {
                tracing::warn!(
                    path = %self.active_path.display(),
                    error = %err,
                    "active session is corrupt, trying backup"
                );
                self.recover()
            }
        }
    }

    /// Restore from the backup, or start over when the backup is unusable too.
    fn recover(&self) -> Result<Session> {
        match read_session_file(&self.backup_path)? {
            SessionRead::Loaded(session) => {
                let bytes = std::fs::read(&self.backup_path).with_context(|| {
                    format!("failed to read backup {}", self.backup_path.display())
                })?;
                write_atomic(&self.active_path, &bytes)?;
                tracing::warn!(
                    session_id = %session.session_id,
                    backup = %self.backup_path.display(),
                    "restored session from backup"
                );
                Ok(session)
            }
            SessionRead::Missing | SessionRead::Corrupt(_) => {
                let session = Session::new(None);
                self.write_active(&session)?;
                tracing::warn!(
                    session_id = %session.session_id,
                    "no usable backup, started a fresh session"
                );
                Ok(session)
            }
        }
    }

    /// Persist `session`, refreshing `last_updated` and rotating the backup.
    pub fn save(&self, session: &mut Session) -> Result<()> {
        self.ensure_dir()?;
        session.last_updated = Utc::now();

        match std::fs::read(&self.active_path) {
            Ok(previous) => write_atomic(&self.backup_path, &previous)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read active session {}", self.active_path.display())
                })
            }
        }

        self.write_active(session)
    }

    /// Return the existing session, or create a new one when absent or when
    /// `overwrite` is set.
    pub fn init(&self, session_id: Option<&str>, overwrite: bool) -> Result<Session> {
        if self.exists() && !overwrite {
            return self.load();
        }

        let mut session = Session::new(session_id);
        self.save(&mut session)?;
        tracing::info!(session_id = %session.session_id, overwrite, "initialized session");
        Ok(session)
    }

    fn write_active(&self, session: &Session) -> Result<()> {
        write_session_file(&self.active_path, session)
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.sessions_dir).with_context(|| {
            format!("failed to create directory {}", self.sessions_dir.display())
        })
    }
}

/// Read and decode a session file. Only I/O errors other than "not found"
/// are returned as `Err`.
pub fn read_session_file(path: &Path) -> Result<SessionRead> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SessionRead::Missing),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read session {}", path.display()))
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(session) => Ok(SessionRead::Loaded(session)),
        Err(err) => Ok(SessionRead::Corrupt(err)),
    }
}

/// Pretty-printed JSON, committed atomically.
pub fn write_session_file(path: &Path, session: &Session) -> Result<()> {
    let json = serde_json::to_vec_pretty(session).context("failed to serialize session")?;
    write_atomic(path, &json)
}
