pub mod init;
pub mod longterm;
pub mod prompt;
pub mod search;
pub mod session;
pub mod status;

use anyhow::{Context, Result};
use serde::Serialize;

use memora::config::MemoraConfig;
use memora::memory::longterm::LongTermLog;
use memora::memory::search::RetrievalIndex;
use memora::session::SessionService;
use memora::workspace::Workspace;

/// Pretty JSON to stdout, UTF-8 kept as-is.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Workspace and session service built from one config.
pub fn open(config: &MemoraConfig) -> Result<(Workspace, SessionService)> {
    let workspace = Workspace::from_config(config);
    workspace.ensure_layout()?;
    let service = SessionService::from_config(config, &workspace);
    Ok((workspace, service))
}

pub fn retrieval_index(config: &MemoraConfig, workspace: &Workspace) -> RetrievalIndex {
    RetrievalIndex::new(LongTermLog::new(workspace), config.retrieval.tie_break)
}
