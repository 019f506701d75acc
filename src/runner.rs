//! Hand a composed prompt to an external generation command.
//!
//! The command runs through `sh -c` with the prompt on stdin. There is no
//! timeout and no retry; a command that cannot be spawned is an error.

use anyhow::{Context, Result};
use std::io::Write;
use std::process::{Command, Stdio};

pub const EMPTY_RESPONSE: &str = "(empty response)";

/// Captured result of one external run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    /// Text to record as the assistant reply: stdout, else stderr, else a
    /// placeholder.
    pub fn reply(&self) -> &str {
        if !self.stdout.is_empty() {
            &self.stdout
        } else if !self.stderr.is_empty() {
            &self.stderr
        } else {
            EMPTY_RESPONSE
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[derive(Debug, Clone)]
pub struct ExternalRunner {
    command: String,
}

impl ExternalRunner {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn run(&self, prompt: &str) -> Result<RunOutput> {
        tracing::info!(command = %self.command, prompt_chars = prompt.len(), "running external command");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.command))?;

        // Feed stdin from another thread so a chatty child can't deadlock us.
        let mut stdin = child.stdin.take().context("child stdin not captured")?;
        let input = prompt.to_owned();
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for `{}`", self.command))?;

        match writer.join() {
            Ok(Ok(())) => {}
            // The child may exit without reading all of stdin.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(e).context("failed to write prompt to child stdin"),
            Err(_) => anyhow::bail!("stdin writer thread panicked"),
        }

        let result = RunOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        };
        if !result.success() {
            tracing::warn!(command = %self.command, code = ?result.code, "external command failed");
        }
        Ok(result)
    }
}
