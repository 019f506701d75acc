//! Crash-safe conversational memory for AI workspace tools.
//!
//! memora keeps one active session per workspace, bounds its size by rotating
//! old messages into a cumulative summary, and composes a layered memory block
//! that primes an external language-model command:
//!
//! | Tier | Source | Lifetime |
//! |------|--------|----------|
//! | **Core memory** | `core/master_memory.md`, edited by hand | Static |
//! | **Session summary** | Digest of rotated-out messages | Grows forever |
//! | **Recent conversation** | Newest messages of the active session | Bounded |
//! | **Long-term memory** | `longterm/memory.jsonl`, lexically searched | Append-only |
//!
//! # Durability
//!
//! - Every session write goes to a temp file and is renamed into place
//! - The previous active file is kept as a one-generation backup
//! - A corrupt active file is restored from the backup, or replaced by a fresh
//!   session when the backup is unusable too
//! - Rotation archives the full pre-rotation session before pruning
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`workspace`]: Directory layout of a workspace
//! - [`session`]: Session store, rotation, archives, and the append path
//! - [`memory`]: Long-term record log and retrieval
//! - [`prompt`]: Prompt composition
//! - [`runner`]: External generation command

pub mod atomic;
pub mod config;
pub mod memory;
pub mod prompt;
pub mod runner;
pub mod session;
pub mod workspace;
