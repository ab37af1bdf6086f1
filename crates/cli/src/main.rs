// SPDX-License-Identifier: MIT

//! tenazas — a thin one-shot subcommand surface over the orchestration
//! kernel.
//! No redraw loop, no long-poll transport: each invocation constructs the
//! storage/bus/engine stack, does one thing, and exits.

mod commands;
mod context;
mod env;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{heartbeat, prompt, run, session, task};
use context::CliContext;
use tenazas_storage::StorageRoot;

#[derive(Parser)]
#[command(name = "tenazas", version, about = "A local orchestrator for coding-agent subprocesses")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a named skill against a session.
    Run(run::RunArgs),
    /// Send a direct prompt, bypassing the skill graph.
    Prompt(prompt::PromptArgs),
    /// Session management.
    Session(session::SessionArgs),
    /// Task management.
    Task(task::TaskArgs),
    /// Heartbeat management.
    Heartbeat(heartbeat::HeartbeatArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = CliContext::build(StorageRoot::from_env());

    match cli.command {
        Commands::Run(args) => run::handle(args, &ctx).await,
        Commands::Prompt(args) => prompt::handle(args, &ctx).await,
        Commands::Session(args) => session::handle(args.command, &ctx),
        Commands::Task(args) => task::handle(args.command, &ctx),
        Commands::Heartbeat(args) => heartbeat::handle(args.command, &ctx).await,
    }
}
