// SPDX-License-Identifier: MIT

//! tenazasd — the daemon binary that owns the Heartbeat Scheduler's tick
//! loop as a long-running background process.

use std::sync::Arc;
use tenazas_daemon::{env, DaemonContext};
use tenazas_storage::StorageRoot;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("tenazasd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                println!("tenazasd {}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("Ticks every heartbeat definition under <storage>/heartbeats");
                println!("on an interval, driving the Skill Engine unattended.");
                println!();
                println!("USAGE:");
                println!("    tenazasd");
                return Ok(());
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let storage = StorageRoot::from_env();
    info!(storage = %storage.base().display(), "starting tenazasd");

    let ctx = Arc::new(DaemonContext::build(storage));
    let interval = env::tick_interval();

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let shutdown = async move {
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    };

    info!(interval_ms = interval.as_millis() as u64, "entering tick loop");
    ctx.run_forever(interval, shutdown).await;
    info!("tenazasd stopped");
    Ok(())
}
