// src/exec/command.rs

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::build::Trace;

/// Everything the engine needs to run one build script.
pub struct ProcessSpec<'a> {
    /// Path of the persisted scratch script.
    pub script: &'a Path,
    /// Working directory of the subprocess.
    pub project_dir: &'a Path,
    /// User to switch to via `su -c`, if any.
    pub run_as: Option<&'a str>,
    /// Shell handed to `su -s` when `run_as` is set.
    pub shell: &'a str,
    /// Extra environment on top of the inherited parent environment.
    pub env: &'a [(String, String)],
    /// Hard wall-clock ceiling; the child is killed when it expires.
    pub timeout: Duration,
}

/// How a fully reaped build subprocess ended.
#[derive(Debug, Clone, Copy)]
pub struct ProcessExit {
    /// Raw exit code; `-1` when the child was killed by a signal (which is
    /// what a timeout or cancellation kill looks like).
    pub code: i32,
    /// The deadline expired and the child was killed.
    pub timed_out: bool,
    /// The caller's cancel signal fired and the child was killed.
    pub cancelled: bool,
}

/// Build the OS-level invocation for a script: `sh -x -e <script>` directly,
/// or wrapped in `su -c "sh -x -e <script>" -s <shell> <user>` when the run
/// should happen as another user.
///
/// `-x -e` gives a traced, exit-on-first-error shell, so every executed
/// command shows up in the output stream.
pub fn build_command(spec: &ProcessSpec<'_>) -> Command {
    let mut cmd = match spec.run_as {
        Some(user) => {
            let script_cmd = format!("sh -x -e {}", spec.script.display());
            let mut c = Command::new("su");
            c.arg("-c").arg(script_cmd).arg("-s").arg(spec.shell).arg(user);
            c
        }
        None => {
            let mut c = Command::new("sh");
            c.arg("-x").arg("-e").arg(spec.script);
            c
        }
    };

    cmd.current_dir(spec.project_dir);
    cmd.envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    cmd
}

/// Run the script to completion (or forced death), funneling its combined
/// output into `trace` line by line.
///
/// The deadline and the optional cancel signal are raced against the output
/// stream in a single `select!`; both converge on the same kill path, and
/// each can fire at most once for exactly this child. A kill closes the
/// child's pipes, which ends the stream and lets the loop fall through to
/// reaping.
///
/// Errors are returned only for setup-class failures (spawn, reap); the
/// script's own exit code, however unusual, is data, not an error.
pub async fn run_process(
    spec: &ProcessSpec<'_>,
    cancel: Option<oneshot::Receiver<()>>,
    trace: &mut Trace,
) -> Result<ProcessExit> {
    let mut cmd = build_command(spec);
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning build script {:?}", spec.script))?;

    // Merge stdout and stderr: both pipes feed one line channel, and the
    // trace records lines in arrival order. Draining the channel here is the
    // natural backpressure point.
    let (line_tx, mut line_rx) = mpsc::channel::<String>(64);
    if let Some(stdout) = child.stdout.take() {
        spawn_line_reader(stdout, line_tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_line_reader(stderr, line_tx.clone());
    }
    drop(line_tx);

    let deadline = tokio::time::sleep(spec.timeout);
    tokio::pin!(deadline);

    let mut cancel_rx = cancel;
    let mut timed_out = false;
    let mut cancelled = false;

    loop {
        tokio::select! {
            line = line_rx.recv() => match line {
                Some(line) => {
                    info!("{line}");
                    trace.push_line(&line);
                }
                // Both pipes closed: the child is done (or dead).
                None => break,
            },
            _ = &mut deadline, if !timed_out && !cancelled => {
                warn!(
                    timeout_secs = spec.timeout.as_secs(),
                    "build deadline expired, killing process"
                );
                timed_out = true;
                kill(&mut child);
            }
            res = recv_cancel(&mut cancel_rx), if cancel_rx.is_some() && !timed_out && !cancelled => {
                // A dropped handle resolves with an error; that just disarms
                // the branch, it is not a cancellation.
                cancel_rx = None;
                if res.is_ok() {
                    warn!("build cancelled, killing process");
                    cancelled = true;
                    kill(&mut child);
                }
            }
        }
    }

    let status = child
        .wait()
        .await
        .context("waiting for build process to exit")?;
    let code = status.code().unwrap_or(-1);

    debug!(code, timed_out, cancelled, "build process reaped");

    Ok(ProcessExit {
        code,
        timed_out,
        cancelled,
    })
}

async fn recv_cancel(
    rx: &mut Option<oneshot::Receiver<()>>,
) -> Result<(), oneshot::error::RecvError> {
    match rx {
        Some(rx) => rx.await,
        // Guarded out in the select!, but keep the arm total.
        None => std::future::pending().await,
    }
}

fn kill(child: &mut Child) {
    // Failure to kill is logged, not fatal: the reap below still resolves
    // whatever the child ends up doing.
    if let Err(err) = child.start_kill() {
        warn!(error = %err, "failed to kill build process");
    }
}

fn spawn_line_reader<R>(reader: R, tx: mpsc::Sender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
}
