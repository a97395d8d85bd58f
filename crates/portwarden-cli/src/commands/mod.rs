//! CLI command definitions and dispatch.

pub mod attach;
pub mod check;
pub mod set;

use clap::{Parser, Subcommand};

/// Portwarden — eBPF TCP port / process-identity filter.
#[derive(Parser, Debug)]
#[command(name = "pwdn", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the filter, configure it, and attach it to a hook.
    Attach(attach::AttachArgs),
    /// Update the policy of an attached filter through its pinned maps.
    Set(set::SetArgs),
    /// Dry-run the decision engine in userspace.
    Check(check::CheckArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Attach(args) => attach::execute(args).await,
        Command::Set(args) => set::execute(args),
        Command::Check(args) => check::execute(args),
    }
}
