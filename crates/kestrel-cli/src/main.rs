//! Kestrel CLI - local-first model routing from the command line.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        reason = "Allow for tests"
    )
)]

use anyhow::Result;
use clap::Parser as _;
use cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

mod cli;
mod handlers;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so --json output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "kestrel=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Route {
            task,
            ram,
            min_trust,
        } => handlers::handle_route(task, ram, min_trust, cli.json).await,
        Command::Models { refresh } => handlers::handle_models(refresh, cli.json).await,
        Command::Default { task, urgent } => {
            handlers::handle_default(task, urgent, cli.json).await
        }
        Command::Recommend { task } => handlers::handle_recommend(task, cli.json),
    }
}
