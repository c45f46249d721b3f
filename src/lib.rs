// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod job;
pub mod logging;
pub mod workspace;

use std::time::Duration;

use tracing::debug;

use crate::build::{BuildExecutor, BuildListener, BuildState};
use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::errors::Result;
use crate::job::BuildJob;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - runner config loading
/// - job descriptor loading
/// - the build executor (with a console listener)
/// - Ctrl-C → cancel handling
///
/// Returns the process exit code: the build's own exit code on a completed
/// pipeline, or the synthetic setup/cancel codes.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_and_validate(&args.config)?;
    let build_job = job::load_from_path(&args.job)?;

    let mut executor = BuildExecutor::new(build_job, cfg.runner);
    if let Some(secs) = args.timeout {
        executor.set_timeout(Duration::from_secs(secs));
    }

    if args.dry_run {
        print_dry_run(&executor);
        return Ok(0);
    }

    executor.add_listener(Box::new(ConsoleListener));

    // Ctrl-C → cancel, converging with the deadline watchdog on the same
    // kill path inside the executor.
    let cancel = executor.cancel_handle();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        cancel.cancel();
    });

    let result = executor.run().await;
    Ok(result.exit_code)
}

/// Prints the finished trace and a one-line summary to stdout.
struct ConsoleListener;

impl BuildListener for ConsoleListener {
    fn build_finished(&self, build_job: &BuildJob, state: BuildState, trace: &str, exit_code: i32) {
        if !trace.is_empty() {
            print!("{trace}");
        }
        println!("build {}: {} (exit code {})", build_job.id, state, exit_code);
    }
}

/// Simple dry-run output: print the job, the planned sync path and the
/// script that would run.
fn print_dry_run(executor: &BuildExecutor) {
    let build_job = executor.job();

    println!("cirun dry-run");
    println!("  job id: {}", build_job.id);
    println!("  ref: {} ({})", build_job.ref_name, build_job.commit_sha);
    println!("  repo: {}", build_job.repo_url);
    println!(
        "  project dir: {}",
        executor.workspace().project_dir().display()
    );
    println!("  timeout: {}s", executor.timeout().as_secs());
    println!("  sync mode: {:?}", executor.sync_mode());
    println!();

    println!("script:");
    for line in executor.script_preview().lines() {
        println!("  {line}");
    }

    debug!("dry-run complete (no execution)");
}
