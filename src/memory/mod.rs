//! Long-term memory: the JSONL record log and lexical retrieval over it.

pub mod longterm;
pub mod search;
