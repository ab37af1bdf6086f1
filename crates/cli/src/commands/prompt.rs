// SPDX-License-Identifier: MIT

//! `tenazas prompt <text>` — direct prompt mode, bypassing the skill graph.

use crate::context::CliContext;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tenazas_core::SessionId;

#[derive(Args)]
pub struct PromptArgs {
    /// The prompt text to send.
    pub text: String,
    /// Existing session id to continue; a fresh session is created otherwise.
    #[arg(long)]
    pub session: Option<String>,
    /// Workspace directory for a freshly created session.
    #[arg(long)]
    pub workspace: Option<PathBuf>,
}

pub async fn handle(args: PromptArgs, ctx: &CliContext) -> Result<()> {
    let session = match args.session {
        Some(id) => ctx.sessions.load(&SessionId::new(id))?,
        None => {
            let workspace = match args.workspace {
                Some(w) => w,
                None => std::env::current_dir()?,
            };
            ctx.sessions.create(workspace)?
        }
    };

    ctx.engine.execute_prompt(&session.id, &args.text).await?;

    let tail = ctx.sessions.tail_audit(&session, 1)?;
    if let Some(entry) = tail.first() {
        println!("{}", entry.content);
    }
    Ok(())
}
