// src/lib.rs

pub mod cli;
pub mod collection;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod notify;
pub mod output;
pub mod proc;
pub mod types;

use std::time::Duration;

use anyhow::anyhow;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::errors::{ProcwatchError, Result};

pub use collection::ProcessCollection;
pub use notify::{ExitEvent, ExitNotifier};
pub use proc::{CommandLine, ProcessHandle, ProcessSpec, SuperviseOptions};
pub use types::{ProcessState, StreamSource};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (or the ad-hoc `-- <command>` form)
/// - a `ProcessCollection` of unstarted handles
/// - batch start, block-until-done, Ctrl-C / deadline handling
/// - a final failure summary mapped to the process exit status
pub async fn run(args: CliArgs) -> Result<()> {
    let plan = if args.command.is_empty() {
        let cfg = config::load_and_validate(&args.config)?;
        if args.dry_run {
            print_dry_run(&cfg);
            return Ok(());
        }
        cfg.supervised()?
    } else {
        let spec = ProcessSpec::argv(args.command.clone()).build()?;
        if args.dry_run {
            println!("procwatch dry-run");
            println!("  - {}", spec.command().display());
            return Ok(());
        }
        vec![(spec, SuperviseOptions::new())]
    };

    let mut collection = ProcessCollection::new();
    for (spec, opts) in plan {
        collection.push(ProcessHandle::new(spec, opts)?);
    }

    let start_outcomes = collection.start_all().await;
    let failed_starts = start_outcomes.iter().filter(|o| o.is_err()).count();
    if failed_starts == collection.len() {
        return Err(ProcwatchError::Other(anyhow!(
            "none of the {} configured processes could be started",
            collection.len()
        )));
    }

    supervise_until_done(&collection, args.timeout.map(Duration::from_secs)).await?;

    let mut failures = failed_starts;
    for handle in collection.iter() {
        if let Some(code) = handle.exit_code().await {
            if code != 0 {
                failures += 1;
            }
        }
    }
    if failures > 0 {
        return Err(ProcwatchError::Other(anyhow!(
            "{failures} process(es) did not finish cleanly"
        )));
    }
    Ok(())
}

/// Wait for the whole collection, racing against Ctrl-C and the optional
/// deadline; both interruptions resolve to an orderly `stop_all`.
async fn supervise_until_done(
    collection: &ProcessCollection,
    deadline: Option<Duration>,
) -> Result<()> {
    let deadline_elapsed = async move {
        match deadline {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        res = collection.block_all(None) => res,
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                eprintln!("failed to listen for Ctrl+C: {err}");
            }
            info!("interrupt received; stopping all processes");
            collection.stop_all(false).await
        }
        _ = deadline_elapsed => {
            info!("deadline reached; stopping all processes");
            collection.stop_all(false).await
        }
    }
}

/// Simple dry-run output: print the process table and resolved settings.
fn print_dry_run(cfg: &ConfigFile) {
    println!("procwatch dry-run");
    println!("  config.poll_interval_ms = {}", cfg.config.poll_interval_ms);
    println!("  config.wrap_columns = {}", cfg.config.wrap_columns);
    println!();

    println!("processes ({}):", cfg.process.len());
    for (id, entry) in cfg.process.iter() {
        println!("  - {id}");
        if let Some(cmd) = &entry.cmd {
            println!("      cmd: {cmd}");
        }
        if let Some(argv) = &entry.argv {
            println!("      argv: {argv:?}");
        }
        if let Some(cwd) = &entry.cwd {
            println!("      cwd: {cwd}");
        }
        if !entry.env.is_empty() {
            println!("      env: {:?}", entry.env);
        }
        if entry.keep_stdout || entry.keep_stderr {
            println!(
                "      keep: stdout={} stderr={}",
                entry.keep_stdout, entry.keep_stderr
            );
        }
        if !entry.print_stdout || !entry.print_stderr {
            println!(
                "      print: stdout={} stderr={}",
                entry.print_stdout, entry.print_stderr
            );
        }
    }
}
