//! Crash-safe file replacement.
//!
//! Content goes to `<path>.tmp`, is fsynced, then renamed over `path`. The
//! rename is the commit point: readers see either the old file or the new
//! one, never a partial write.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temporary sibling used while writing `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically replace `path` with `contents`, creating parent directories.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let tmp_path = temp_path(path);
    let mut file = File::create(&tmp_path)
        .with_context(|| format!("failed to create temp file {}", tmp_path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("failed to write temp file {}", tmp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("failed to sync temp file {}", tmp_path.display()))?;
    drop(file);

    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to rename {} over {}", tmp_path.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn temp_path_appends_suffix() {
        let p = Path::new("/a/b/active_session.json");
        assert_eq!(temp_path(p), PathBuf::from("/a/b/active_session.json.tmp"));
    }

    #[test]
    fn write_replaces_and_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deep").join("file.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert!(!temp_path(&path).exists());
    }
}
