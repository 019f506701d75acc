//! Prompt composition.
//!
//! A composed prompt is four memory sections followed by the user request:
//!
//! ```text
//! ### CORE MEMORY
//! ### SESSION SUMMARY
//! ### RECENT CONVERSATION
//! ### LONG-TERM MEMORY
//! ### USER REQUEST
//! ```
//!
//! [`render_prompt`] does the formatting and touches no files;
//! [`PromptComposer`] gathers its inputs from the workspace.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::memory::search::RetrievalIndex;
use crate::session::store::SessionStore;
use crate::session::types::{Conversation, Session};

pub const EMPTY_PLACEHOLDER: &str = "(empty)";
pub const NO_LONGTERM_PLACEHOLDER: &str = "(no relevant long-term memory found)";

pub struct PromptComposer<'a> {
    core_memory_path: PathBuf,
    store: &'a SessionStore,
    index: &'a RetrievalIndex,
    limit: usize,
}

impl<'a> PromptComposer<'a> {
    pub fn new(
        core_memory_path: impl Into<PathBuf>,
        store: &'a SessionStore,
        index: &'a RetrievalIndex,
        limit: usize,
    ) -> Self {
        Self {
            core_memory_path: core_memory_path.into(),
            store,
            index,
            limit,
        }
    }

    /// The four memory sections for `user_input`, without the request itself.
    pub fn memory_block(&self, user_input: &str) -> Result<String> {
        let (core, session, matches) = self.gather(user_input)?;
        Ok(render_memory_block(&core, &session, &matches))
    }

    /// Full payload for an external generation process.
    pub fn compose(&self, user_input: &str) -> Result<String> {
        let (core, session, matches) = self.gather(user_input)?;
        Ok(render_prompt(&core, &session, &matches, user_input))
    }

    fn gather(&self, user_input: &str) -> Result<(String, Session, Vec<String>)> {
        let core = load_core_memory(&self.core_memory_path)?;
        let session = self.store.load()?;
        let matches = self.index.search(user_input, self.limit)?;
        Ok((core, session, matches))
    }
}

/// Trimmed core memory text; empty when the file does not exist.
pub fn load_core_memory(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e).with_context(|| format!("failed to read core memory {}", path.display())),
    }
}

/// `[ROLE] content` per message, oldest first.
pub fn format_conversation(conversation: &Conversation) -> String {
    if conversation.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }
    conversation
        .iter()
        .map(|m| format!("[{}] {}", m.role.as_str().to_uppercase(), m.content.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_longterm(matches: &[String]) -> String {
    if matches.is_empty() {
        return NO_LONGTERM_PLACEHOLDER.to_string();
    }
    matches
        .iter()
        .map(|text| format!("- {text}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_memory_block(core: &str, session: &Session, matches: &[String]) -> String {
    let core = core.trim();
    let summary = session.summary.trim();
    [
        section("CORE MEMORY", or_placeholder(core)),
        section("SESSION SUMMARY", or_placeholder(summary)),
        section("RECENT CONVERSATION", &format_conversation(&session.conversation)),
        section("LONG-TERM MEMORY", &format_longterm(matches)),
    ]
    .join("\n\n")
}

pub fn render_prompt(core: &str, session: &Session, matches: &[String], user_input: &str) -> String {
    format!(
        "{}\n\n{}",
        render_memory_block(core, session, matches),
        section("USER REQUEST", user_input)
    )
}

fn section(title: &str, body: &str) -> String {
    format!("### {title}\n{body}")
}

fn or_placeholder(text: &str) -> &str {
    if text.is_empty() {
        EMPTY_PLACEHOLDER
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::{Message, Role};

    #[test]
    fn placeholders_for_empty_inputs() {
        let session = Session::new(Some("s"));

        let prompt = render_prompt("", &session, &[], "hello");

        assert_eq!(
            prompt,
            "### CORE MEMORY\n(empty)\n\n\
             ### SESSION SUMMARY\n(empty)\n\n\
             ### RECENT CONVERSATION\n(empty)\n\n\
             ### LONG-TERM MEMORY\n(no relevant long-term memory found)\n\n\
             ### USER REQUEST\nhello"
        );
    }

    #[test]
    fn renders_populated_sections_in_order() {
        let mut session = Session::new(Some("s"));
        session.summary = "we chose sqlite".into();
        session.conversation.push(Message::new(Role::User, "  what db?  "));
        session.conversation.push(Message::new(Role::Assistant, "sqlite"));

        let block = render_memory_block(
            "be concise",
            &session,
            &["db decisions live in ADR-3".to_string()],
        );

        let core = block.find("be concise").unwrap();
        let summary = block.find("we chose sqlite").unwrap();
        let convo = block.find("[USER] what db?\n[ASSISTANT] sqlite").unwrap();
        let lt = block.find("- db decisions live in ADR-3").unwrap();
        assert!(core < summary && summary < convo && convo < lt);
        assert!(!block.contains("USER REQUEST"));
    }

    #[test]
    fn missing_core_memory_reads_as_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let text = load_core_memory(&tmp.path().join("absent.md")).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn whitespace_only_summary_uses_placeholder() {
        let mut session = Session::new(Some("s"));
        session.summary = "  \n ".into();
        let block = render_memory_block("  ", &session, &[]);
        assert!(block.starts_with("### CORE MEMORY\n(empty)\n\n### SESSION SUMMARY\n(empty)"));
    }
}
