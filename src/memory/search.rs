use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::memory::longterm::LongTermLog;

// ── Public types ──────────────────────────────────────────────────────────────

/// Ordering among records with equal scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Earlier lines in the log first.
    #[default]
    FileOrder,
    /// Later lines in the log first.
    NewestFirst,
}

/// A matching record and its lexical score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredText {
    pub score: usize,
    pub text: String,
}

/// Lexical relevance search over the long-term log.
#[derive(Debug, Clone)]
pub struct RetrievalIndex {
    log: LongTermLog,
    tie_break: TieBreak,
}

// ── Public API ────────────────────────────────────────────────────────────────

impl RetrievalIndex {
    pub fn new(log: LongTermLog, tie_break: TieBreak) -> Self {
        Self { log, tie_break }
    }

    pub fn log(&self) -> &LongTermLog {
        &self.log
    }

    /// Texts of the best `limit` matches for `query`, best first.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        Ok(self
            .search_scored(query, limit)?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// Like [`search`](Self::search) but keeps the scores.
    pub fn search_scored(&self, query: &str, limit: usize) -> Result<Vec<ScoredText>> {
        let tokens = tokenize(query);
        if tokens.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<ScoredText> = self
            .log
            .records()?
            .into_iter()
            .filter_map(|record| {
                let score = score_text(&tokens, &record.text.to_lowercase());
                (score > 0).then_some(ScoredText {
                    score,
                    text: record.text,
                })
            })
            .collect();

        if self.tie_break == TieBreak::NewestFirst {
            hits.reverse();
        }
        // Stable: equal scores keep the order established above.
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(limit);

        tracing::debug!(query, tokens = tokens.len(), hits = hits.len(), "long-term search");
        Ok(hits)
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Whitespace-split, lowercased query terms longer than one character.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|t| t.chars().count() > 1)
        .collect()
}

/// Sum of non-overlapping substring occurrences of each token.
pub fn score_text(tokens: &[String], lowered: &str) -> usize {
    tokens.iter().map(|t| lowered.matches(t.as_str()).count()).sum()
}
