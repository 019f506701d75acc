use anyhow::Result;

use memora::config::MemoraConfig;
use memora::workspace::Workspace;

/// Run a long-term memory search from the terminal.
pub fn search(config: &MemoraConfig, query: &str, limit: Option<usize>) -> Result<()> {
    let workspace = Workspace::from_config(config);
    let index = super::retrieval_index(config, &workspace);
    let limit = limit.unwrap_or(config.retrieval.default_limit);

    let hits = index.search_scored(query, limit)?;

    if hits.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s)\n", hits.len());

    for (i, hit) in hits.iter().enumerate() {
        let preview = if hit.text.chars().count() > 120 {
            format!("{}...", hit.text.chars().take(120).collect::<String>())
        } else {
            hit.text.clone()
        };

        println!("  {}. (score: {})", i + 1, hit.score);
        println!("     {}", preview);
        println!();
    }

    Ok(())
}
