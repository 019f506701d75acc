//! Write-once snapshots of sessions taken at rotation time.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::session::store::write_session_file;
use crate::session::types::Session;
use crate::workspace::Workspace;

/// Directory of `<session_id>_<YYYYMMDDTHHMMSSZ>.json` snapshots.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    dir: PathBuf,
}

impl ArchiveStore {
    pub fn new(workspace: &Workspace) -> Self {
        Self::at(workspace.archive_dir())
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `snapshot` under a name no existing archive uses.
    ///
    /// Two rotations in the same second get `_1`, `_2`, ... suffixes rather
    /// than overwriting each other.
    pub fn write(&self, snapshot: &Session, at: DateTime<Utc>) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create directory {}", self.dir.display()))?;

        let stem = format!(
            "{}_{}",
            sanitize_id(&snapshot.session_id),
            at.format("%Y%m%dT%H%M%SZ")
        );
        let mut path = self.dir.join(format!("{stem}.json"));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{stem}_{n}.json"));
            n += 1;
        }

        write_session_file(&path, snapshot)?;
        tracing::info!(path = %path.display(), "archived session snapshot");
        Ok(path)
    }

    /// Archive files sorted by name. Empty when the directory does not exist.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to list archives in {}", self.dir.display()))
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

/// Keep session ids from escaping the archive directory.
fn sanitize_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "session".to_string(),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::{read_session_file, SessionRead};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap()
    }

    #[test]
    fn archive_name_uses_id_and_compact_timestamp() {
        let tmp = TempDir::new().unwrap();
        let archives = ArchiveStore::at(tmp.path().join("archive"));

        let path = archives.write(&Session::new(Some("proj")), fixed_time()).unwrap();

        assert_eq!(path.file_name().unwrap(), "proj_20250304T050607Z.json");
        assert!(matches!(read_session_file(&path).unwrap(), SessionRead::Loaded(_)));
    }

    #[test]
    fn same_second_does_not_overwrite() {
        let tmp = TempDir::new().unwrap();
        let archives = ArchiveStore::at(tmp.path());
        let mut first = Session::new(Some("proj"));
        first.summary = "first".into();
        let second = Session::new(Some("proj"));

        let a = archives.write(&first, fixed_time()).unwrap();
        let b = archives.write(&second, fixed_time()).unwrap();

        assert_ne!(a, b);
        assert_eq!(b.file_name().unwrap(), "proj_20250304T050607Z_1.json");
        match read_session_file(&a).unwrap() {
            SessionRead::Loaded(s) => assert_eq!(s.summary, "first"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(archives.list().unwrap().len(), 2);
    }

    #[test]
    fn list_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let archives = ArchiveStore::at(tmp.path().join("nope"));
        assert!(archives.list().unwrap().is_empty());
    }

    #[test]
    fn path_separators_are_sanitized() {
        assert_eq!(sanitize_id("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_id(".."), "session");
        assert_eq!(sanitize_id("2025-01-01-default"), "2025-01-01-default");
    }
}
