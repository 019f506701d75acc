//! CLI `build` and `ask` commands.

use anyhow::Result;
use std::process::ExitCode;

use memora::config::MemoraConfig;
use memora::prompt::PromptComposer;
use memora::runner::ExternalRunner;

/// Print the composed prompt for `user_input`.
pub fn build(config: &MemoraConfig, user_input: &str) -> Result<()> {
    let (workspace, service) = super::open(config)?;
    let index = super::retrieval_index(config, &workspace);
    let composer = PromptComposer::new(
        workspace.core_memory_path(),
        service.store(),
        &index,
        config.retrieval.default_limit,
    );

    println!("{}", composer.compose(user_input)?);
    Ok(())
}

/// Record the request, run the external command, record and print its reply.
///
/// Exits with the child's exit code.
pub fn ask(
    config: &MemoraConfig,
    user_input: &str,
    cmd: Option<&str>,
    dry_run: bool,
) -> Result<ExitCode> {
    let (workspace, service) = super::open(config)?;
    let index = super::retrieval_index(config, &workspace);
    let composer = PromptComposer::new(
        workspace.core_memory_path(),
        service.store(),
        &index,
        config.retrieval.default_limit,
    );

    service.add_message("user", user_input)?;
    let prompt = composer.compose(user_input)?;

    if dry_run {
        println!("{prompt}");
        return Ok(ExitCode::SUCCESS);
    }

    let runner = ExternalRunner::new(cmd.unwrap_or(&config.runner.command));
    let output = runner.run(&prompt)?;
    let reply = output.reply().to_string();
    service.add_message("assistant", &reply)?;
    println!("{reply}");

    Ok(match output.code {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    })
}
