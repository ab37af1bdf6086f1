// SPDX-License-Identifier: MIT

//! `tenazas heartbeat tick <name>` — run one heartbeat tick on demand,
//! useful for exercising a heartbeat without the daemon's background loop.

use crate::context::CliContext;
use anyhow::Result;
use clap::{Args, Subcommand};
use std::sync::Arc;
use tenazas_engine::{load_heartbeat_def, HeartbeatScheduler};
use tenazas_storage::{SessionStore, TaskStore};

#[derive(Args)]
pub struct HeartbeatArgs {
    #[command(subcommand)]
    pub command: HeartbeatCommand,
}

#[derive(Subcommand)]
pub enum HeartbeatCommand {
    /// Run a single tick for the named heartbeat definition.
    Tick { name: String },
}

pub async fn handle(command: HeartbeatCommand, ctx: &CliContext) -> Result<()> {
    match command {
        HeartbeatCommand::Tick { name } => {
            let def = load_heartbeat_def(&ctx.storage, &name)?;
            let sessions = SessionStore::new(ctx.storage.clone(), Arc::clone(&ctx.clock));
            let tasks = TaskStore::new(ctx.storage.clone(), Arc::clone(&ctx.clock));
            let scheduler = HeartbeatScheduler::new(
                ctx.storage.clone(),
                sessions,
                tasks,
                Arc::clone(&ctx.engine),
                ctx.bus.clone(),
                Arc::clone(&ctx.clock),
            );
            scheduler.tick(&def).await?;
            println!("ticked heartbeat {name:?}");
        }
    }
    Ok(())
}
