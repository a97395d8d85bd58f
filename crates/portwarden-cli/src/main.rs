//! # pwdn — Portwarden CLI
//!
//! Loader, control plane, and verdict observer for the Portwarden eBPF
//! filter. Single binary for attaching the filter to a hook, updating the
//! policy live, and dry-running the decision engine.

mod commands;
mod events;
mod loader;

use clap::Parser;

use crate::commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    commands::execute(cli).await
}
