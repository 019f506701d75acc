use anyhow::Result;

use memora::config::MemoraConfig;
use memora::memory::longterm::LongTermLog;
use memora::session::stats::session_stats;

/// Print session statistics as JSON.
pub fn status(config: &MemoraConfig) -> Result<()> {
    let (workspace, service) = super::open(config)?;

    let stats = session_stats(
        workspace.root().to_path_buf(),
        service.store(),
        service.rotation().archives(),
        &LongTermLog::new(&workspace),
    )?;

    super::print_json(&stats)
}
