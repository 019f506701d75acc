mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use memora::config::MemoraConfig;

#[derive(Parser)]
#[command(name = "memora", version, about = "Crash-safe session memory for AI workspace tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the workspace layout, seed core memory, and start a session
    Init {
        /// Session id (default: <date>-default)
        #[arg(long)]
        session_id: Option<String>,
        /// Replace an existing active session
        #[arg(long)]
        overwrite: bool,
        /// Do not write the default core memory file
        #[arg(long)]
        no_core_seed: bool,
    },
    /// Append a message to the active session
    Add {
        /// user, assistant, or system
        role: String,
        content: String,
    },
    /// Print the active session as JSON
    Show,
    /// Print session, archive, and long-term counts
    Status,
    /// Print the workspace root
    Where,
    /// Print the composed prompt without recording anything
    Build { user_input: String },
    /// Record a request, run the external command on the composed prompt,
    /// and record its reply
    Ask {
        user_input: String,
        /// Shell command receiving the prompt on stdin (default: runner.command)
        #[arg(long)]
        cmd: Option<String>,
        /// Print the prompt instead of running the command
        #[arg(long)]
        dry_run: bool,
    },
    /// Search long-term memory
    Search {
        query: String,
        /// Maximum results (default: retrieval.default_limit)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Read or append the long-term memory log
    Longterm {
        #[command(subcommand)]
        action: LongtermAction,
    },
}

#[derive(Subcommand)]
enum LongtermAction {
    /// Append a record
    Add {
        text: String,
        /// Metadata entry as key=value (repeatable)
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
    },
    /// Print records with content hashes, as pushed by remote sync
    Rows,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = MemoraConfig::load()?;

    // Log to stderr so stdout stays clean for JSON and prompt output.
    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Init {
            session_id,
            overwrite,
            no_core_seed,
        } => cli::init::init(&config, session_id.as_deref(), overwrite, !no_core_seed)?,
        Command::Add { role, content } => cli::session::add(&config, &role, &content)?,
        Command::Show => cli::session::show(&config)?,
        Command::Status => cli::status::status(&config)?,
        Command::Where => println!("{}", config.resolved_root().display()),
        Command::Build { user_input } => cli::prompt::build(&config, &user_input)?,
        Command::Ask {
            user_input,
            cmd,
            dry_run,
        } => return cli::prompt::ask(&config, &user_input, cmd.as_deref(), dry_run),
        Command::Search { query, limit } => cli::search::search(&config, &query, limit)?,
        Command::Longterm { action } => match action {
            LongtermAction::Add { text, meta } => cli::longterm::add(&config, &text, &meta)?,
            LongtermAction::Rows => cli::longterm::rows(&config)?,
        },
    }

    Ok(ExitCode::SUCCESS)
}
