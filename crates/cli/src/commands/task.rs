// SPDX-License-Identifier: MIT

//! `tenazas task ls|show|add|start|done|block` — CRUD and status
//! transitions over the Task Store.

use crate::context::CliContext;
use crate::env::instance_id;
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use tenazas_core::{Owner, TaskId, TaskStatus};

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// List every task in a workspace.
    Ls {
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
    /// Show one task's full record.
    Show {
        id: String,
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
    /// Create a new task.
    Add {
        title: String,
        #[arg(long)]
        workspace: Option<PathBuf>,
        #[arg(long, default_value = "0")]
        priority: u32,
    },
    /// Transition a task to in-progress, claiming ownership for this process.
    Start {
        id: String,
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
    /// Transition a task to done.
    Done {
        id: String,
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
    /// Transition a task to blocked.
    Block {
        id: String,
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(w) => Ok(w),
        None => Ok(std::env::current_dir()?),
    }
}

pub fn handle(command: TaskCommand, ctx: &CliContext) -> Result<()> {
    match command {
        TaskCommand::Ls { workspace } => {
            let workspace = resolve_workspace(workspace)?;
            let tasks = ctx.tasks.list(&workspace)?;
            if tasks.is_empty() {
                println!("no tasks");
                return Ok(());
            }
            for task in tasks {
                println!(
                    "{}  {:?}  prio={}  fails={}  {}",
                    task.id, task.status, task.priority, task.failure_count, task.title,
                );
            }
        }
        TaskCommand::Show { id, workspace } => {
            let workspace = resolve_workspace(workspace)?;
            let task = ctx.tasks.load(&workspace, &TaskId::from(id))?;
            println!("id: {}", task.id);
            println!("title: {}", task.title);
            println!("status: {:?}", task.status);
            println!("priority: {}", task.priority);
            println!("failure_count: {}", task.failure_count);
            println!("blocked_by: {:?}", task.blocked_by);
            println!("blocks: {:?}", task.blocks);
            println!("owner: {:?}", task.owner);
            println!("skill: {:?}", task.skill);
        }
        TaskCommand::Add {
            title,
            workspace,
            priority,
        } => {
            let workspace = resolve_workspace(workspace)?;
            let mut task = ctx.tasks.create(&workspace, title)?;
            task.priority = priority;
            ctx.tasks.save(&workspace, &task)?;
            println!("created {}", task.id);
        }
        TaskCommand::Start { id, workspace } => {
            let workspace = resolve_workspace(workspace)?;
            let owner = Owner {
                pid: std::process::id(),
                instance_id: instance_id(),
                session_id: None,
            };
            let task = ctx
                .tasks
                .transition(&workspace, &TaskId::from(id), TaskStatus::InProgress, Some(owner))?;
            println!("{} -> {:?}", task.id, task.status);
        }
        TaskCommand::Done { id, workspace } => {
            let workspace = resolve_workspace(workspace)?;
            let task = ctx
                .tasks
                .transition(&workspace, &TaskId::from(id), TaskStatus::Done, None)?;
            println!("{} -> {:?}", task.id, task.status);
            if let Some(archive_dir) = ctx.tasks.check_and_archive(&workspace)? {
                println!("all tasks done; archived to {}", archive_dir.display());
            }
        }
        TaskCommand::Block { id, workspace } => {
            let workspace = resolve_workspace(workspace)?;
            let task = ctx
                .tasks
                .transition(&workspace, &TaskId::from(id), TaskStatus::Blocked, None)?;
            println!("{} -> {:?}", task.id, task.status);
        }
    }
    Ok(())
}
