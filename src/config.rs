use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::memory::search::TieBreak;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MemoraConfig {
    pub logging: LoggingConfig,
    pub workspace: WorkspaceConfig,
    pub session: SessionConfig,
    pub retrieval: RetrievalConfig,
    pub runner: RunnerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub root: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub max_conversation_turns: usize,
    pub keep_recent_turns: usize,
    pub summary_item_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_limit: usize,
    pub tie_break: TieBreak,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunnerConfig {
    pub command: String,
}

impl Default for MemoraConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            workspace: WorkspaceConfig::default(),
            session: SessionConfig::default(),
            retrieval: RetrievalConfig::default(),
            runner: RunnerConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root().to_string_lossy().into_owned(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_conversation_turns: 20,
            keep_recent_turns: 10,
            summary_item_chars: 220,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: 4,
            tie_break: TieBreak::FileOrder,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: "cat".into(),
        }
    }
}

/// Returns `<cwd>/.memora`, falling back to a relative `.memora` if the
/// current directory is unavailable.
pub fn default_workspace_root() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".memora")
}

/// Workspace root from `MEMORA_HOME` if set and non-blank, else the default.
pub fn env_workspace_root() -> PathBuf {
    match std::env::var("MEMORA_HOME") {
        Ok(val) if !val.trim().is_empty() => expand_tilde(val.trim()),
        _ => default_workspace_root(),
    }
}

impl MemoraConfig {
    /// Resolve the workspace root from the environment, then load
    /// `<root>/config.toml` (if it exists) and apply env var overrides.
    ///
    /// A `[workspace] root` in that file relocates the data directories but
    /// not the config file itself.
    pub fn load() -> Result<Self> {
        Self::load_from(env_workspace_root().join("config.toml"))
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MemoraConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (MEMORA_HOME, MEMORA_LOG_LEVEL, MEMORA_LLM_CMD).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MEMORA_HOME") {
            if !val.trim().is_empty() {
                self.workspace.root = val.trim().to_string();
            }
        }
        if let Ok(val) = std::env::var("MEMORA_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("MEMORA_LLM_CMD") {
            if !val.trim().is_empty() {
                self.runner.command = val;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let session = &self.session;
        if session.keep_recent_turns == 0 {
            bail!("session.keep_recent_turns must be greater than zero");
        }
        if session.keep_recent_turns > session.max_conversation_turns {
            bail!(
                "session.keep_recent_turns ({}) must not exceed session.max_conversation_turns ({})",
                session.keep_recent_turns,
                session.max_conversation_turns
            );
        }
        Ok(())
    }

    /// Resolve the workspace root, expanding `~` if needed.
    pub fn resolved_root(&self) -> PathBuf {
        expand_tilde(&self.workspace.root)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    }
}
