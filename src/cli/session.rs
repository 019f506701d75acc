use anyhow::Result;

use memora::config::MemoraConfig;

/// Append a message and print the resulting session.
pub fn add(config: &MemoraConfig, role: &str, content: &str) -> Result<()> {
    let (_, service) = super::open(config)?;
    let outcome = service.add_message(role, content)?;
    if let Some(ref rotation) = outcome.rotation {
        eprintln!(
            "Rotated: {} messages summarized, archive at {}",
            rotation.pruned,
            rotation.archive_path.display()
        );
    }
    super::print_json(&outcome.session)
}

pub fn show(config: &MemoraConfig) -> Result<()> {
    let (_, service) = super::open(config)?;
    super::print_json(&service.load()?)
}
