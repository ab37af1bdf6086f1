// SPDX-License-Identifier: MIT

//! `tenazas run <skill>` — bind a skill run to a session and drive it to
//! completion or intervention.

use crate::context::CliContext;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tenazas_core::SessionId;
use tenazas_engine::load_skill;

#[derive(Args)]
pub struct RunArgs {
    /// Name of the skill to run.
    pub skill: String,
    /// Existing session id to resume; a fresh session is created otherwise.
    #[arg(long)]
    pub session: Option<String>,
    /// Workspace directory the skill runs in (defaults to the current directory).
    #[arg(long)]
    pub workspace: Option<PathBuf>,
}

pub async fn handle(args: RunArgs, ctx: &CliContext) -> Result<()> {
    let workspace = match args.workspace {
        Some(w) => w,
        None => std::env::current_dir()?,
    };

    let session = match args.session {
        Some(id) => ctx.sessions.load(&SessionId::new(id))?,
        None => ctx.sessions.create(workspace)?,
    };

    let skill = load_skill(&ctx.storage, &args.skill)?;
    println!("session {} running skill {:?}", session.id, args.skill);
    ctx.engine.run(&session.id, &skill).await?;

    let reloaded = ctx.sessions.load(&session.id)?;
    println!("status: {:?}", reloaded.status);
    Ok(())
}
