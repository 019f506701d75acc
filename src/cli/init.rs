//! CLI `init` command: prepare a workspace and start a session.

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use memora::config::MemoraConfig;
use memora::session::types::Session;

#[derive(Serialize)]
struct InitReport {
    ok: bool,
    workspace: PathBuf,
    core_memory_seeded: bool,
    session: Session,
}

pub fn init(
    config: &MemoraConfig,
    session_id: Option<&str>,
    overwrite: bool,
    seed_core: bool,
) -> Result<()> {
    let (workspace, service) = super::open(config)?;

    let core_memory_seeded = if seed_core {
        workspace.seed_core_memory()?
    } else {
        false
    };
    let session = service.init(session_id, overwrite)?;

    super::print_json(&InitReport {
        ok: true,
        workspace: workspace.root().to_path_buf(),
        core_memory_seeded,
        session,
    })
}
