// SPDX-License-Identifier: MIT

//! `tenazas session ls|show|rm` — read-only/archival views over the
//! Session Store.

use crate::context::CliContext;
use anyhow::Result;
use clap::{Args, Subcommand};
use tenazas_core::SessionId;

#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// List active (non-archived) sessions.
    Ls,
    /// Show one session's metadata and audit tail.
    Show {
        id: String,
        /// Number of trailing audit entries to print.
        #[arg(short = 'n', long, default_value = "20")]
        lines: usize,
    },
    /// Archive a session.
    Rm { id: String },
}

pub fn handle(command: SessionCommand, ctx: &CliContext) -> Result<()> {
    match command {
        SessionCommand::Ls => {
            let active = ctx.sessions.list_active()?;
            if active.is_empty() {
                println!("no active sessions");
                return Ok(());
            }
            for entry in active {
                println!(
                    "{}  {}  {}  {}",
                    entry.id,
                    entry.last_updated.to_rfc3339(),
                    entry.cwd.display(),
                    entry.title,
                );
            }
        }
        SessionCommand::Show { id, lines } => {
            let session = ctx.sessions.load(&SessionId::new(id))?;
            println!("id: {}", session.id);
            println!("workspace: {}", session.workspace.display());
            println!("title: {}", session.title);
            println!("status: {:?}", session.status);
            println!("active_skill: {:?}", session.active_skill);
            println!("active_node: {:?}", session.active_node);
            println!("approval_mode: {:?}", session.approval_mode);
            println!("--- last {lines} audit entries ---");
            for entry in ctx.sessions.tail_audit(&session, lines)? {
                println!("[{:?}] {}: {}", entry.kind, entry.source, entry.content);
            }
        }
        SessionCommand::Rm { id } => {
            let mut session = ctx.sessions.load(&SessionId::new(id))?;
            ctx.sessions.archive(&mut session)?;
            println!("archived session {}", session.id);
        }
    }
    Ok(())
}
