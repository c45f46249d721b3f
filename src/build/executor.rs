// src/build/executor.rs

use std::time::Duration;

use anyhow::Result;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::build::state::BuildState;
use crate::build::trace::Trace;
use crate::config::RunnerSection;
use crate::exec::{compose_script, run_process, write_script, ProcessExit, ProcessSpec};
use crate::job::BuildJob;
use crate::workspace::{SyncMode, SyncPlanner, Workspace};

/// Synthetic exit code for setup/IO failures: the scratch script could not
/// be written or the process could not be launched/reaped.
pub const EXIT_SETUP_FAILURE: i32 = 2;

/// Synthetic exit code for runs killed through a [`CancelHandle`].
pub const EXIT_CANCELLED: i32 = 3;

/// Receives exactly one terminal callback per executor run.
///
/// Listeners are invoked in registration order, after the subprocess has
/// been reaped and the watchdog disarmed. No isolation is applied: a
/// panicking listener unwinds through `run`.
pub trait BuildListener: Send {
    fn build_finished(&self, job: &BuildJob, state: BuildState, trace: &str, exit_code: i32);
}

/// Structured outcome of one run, returned by [`BuildExecutor::run`] in
/// addition to the listener callbacks.
#[derive(Debug)]
pub struct BuildResult {
    pub state: BuildState,
    pub exit_code: i32,
    pub trace: String,
}

/// One-shot cancel signal for an active run.
///
/// Cancellation converges with the deadline watchdog on the same kill path;
/// a cancelled run terminates in [`BuildState::Cancelled`] with exit code
/// [`EXIT_CANCELLED`]. Dropping the handle without calling [`cancel`]
/// disarms it.
///
/// [`cancel`]: CancelHandle::cancel
pub struct CancelHandle {
    tx: oneshot::Sender<()>,
}

impl CancelHandle {
    pub fn cancel(self) {
        // The receiver is gone once the run has concluded; nothing to do then.
        let _ = self.tx.send(());
    }
}

/// Executes one build job from start to terminal notification.
///
/// An executor instance is owned by a single driving task for its entire
/// run: listeners and the timeout are configured up front, `run` consumes
/// the executor, and exactly one notification cycle happens at the end.
pub struct BuildExecutor {
    job: BuildJob,
    runner: RunnerSection,
    workspace: Workspace,
    timeout: Duration,
    state: BuildState,
    listeners: Vec<Box<dyn BuildListener>>,
    cancel_rx: Option<oneshot::Receiver<()>>,
}

impl BuildExecutor {
    /// Construct an executor for a job under the given runner configuration.
    ///
    /// The workspace layout (project dir, checkout dir, safe project name)
    /// is derived here, once.
    pub fn new(job: BuildJob, runner: RunnerSection) -> Self {
        let workspace = Workspace::new(&runner.build_dir, &job);
        let timeout = Duration::from_secs(runner.timeout);
        Self {
            job,
            runner,
            workspace,
            timeout,
            state: BuildState::Waiting,
            listeners: Vec::new(),
            cancel_rx: None,
        }
    }

    pub fn job(&self) -> &BuildJob {
        &self.job
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Override the deadline. Only meaningful before `run` starts.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Register a listener. Order is preserved, duplicates are permitted,
    /// and registration must complete before the run starts.
    pub fn add_listener(&mut self, listener: Box<dyn BuildListener>) {
        self.listeners.push(listener);
    }

    /// Create a cancel handle for this run.
    ///
    /// Each call arms a fresh signal and replaces any previous one; only the
    /// handle from the last call is live.
    pub fn cancel_handle(&mut self) -> CancelHandle {
        let (tx, rx) = oneshot::channel();
        self.cancel_rx = Some(rx);
        CancelHandle { tx }
    }

    /// The sync path that would be taken right now (reads the filesystem).
    pub fn sync_mode(&self) -> SyncMode {
        SyncPlanner::new(&self.workspace, &self.job).mode()
    }

    /// The rendered sync command for the current mode.
    pub fn sync_command(&self) -> String {
        SyncPlanner::new(&self.workspace, &self.job).command()
    }

    /// The full script text as it would be executed (sync + job commands).
    pub fn script_preview(&self) -> String {
        compose_script(&self.sync_command(), &self.job.commands)
    }

    /// Run the build to its terminal state and notify every listener
    /// exactly once.
    ///
    /// Never returns an error: every failure class is converted into a
    /// terminal state plus an exit code. Consuming `self` is what makes the
    /// exactly-once notification and the no-state-regression guarantees
    /// structural rather than conventional.
    pub async fn run(mut self) -> BuildResult {
        let mut trace = Trace::new();

        self.advance(BuildState::Running);
        info!(job_id = self.job.id, git_ref = %self.job.ref_name, "starting build");

        let (state, exit_code) = match self.execute(&mut trace).await {
            Ok(exit) if exit.cancelled => {
                warn!(job_id = self.job.id, "build cancelled");
                (BuildState::Cancelled, EXIT_CANCELLED)
            }
            Ok(exit) => {
                if exit.timed_out {
                    warn!(job_id = self.job.id, code = exit.code, "build hit its deadline");
                }
                info!(job_id = self.job.id, code = exit.code, "finished build");
                (BuildState::Success, exit.code)
            }
            Err(err) => {
                error!(
                    job_id = self.job.id,
                    error = %err,
                    "build failed before the script could complete"
                );
                (BuildState::Failed, EXIT_SETUP_FAILURE)
            }
        };

        self.advance(state);

        // Terminal notification: happens-after reaping and watchdog
        // disarmament, exactly once per listener, in registration order.
        for listener in &self.listeners {
            listener.build_finished(&self.job, state, trace.as_str(), exit_code);
        }

        BuildResult {
            state,
            exit_code,
            trace: trace.into_string(),
        }
    }

    /// Sync, compose, persist and execute the script.
    ///
    /// Errors from this function are setup-class failures; a script that ran
    /// and exited non-zero is an `Ok` with that code.
    async fn execute(&mut self, trace: &mut Trace) -> Result<ProcessExit> {
        self.workspace.ensure_project_dir()?;

        let sync_command = SyncPlanner::new(&self.workspace, &self.job).command();
        let contents = compose_script(&sync_command, &self.job.commands);
        debug!(job_id = self.job.id, script = %contents, "composed build script");

        // The guard keeps the scratch file alive until this scope ends, so
        // it is removed on every exit path once the child has been reaped.
        let script = write_script(self.workspace.project_dir(), &contents)?;

        let env = ci_env(&self.job);
        let spec = ProcessSpec {
            script: script.path(),
            project_dir: self.workspace.project_dir(),
            run_as: self.runner.run_as.as_deref(),
            shell: &self.runner.shell,
            env: &env,
            timeout: self.timeout,
        };

        run_process(&spec, self.cancel_rx.take(), trace).await
    }

    // Transitions only move forward: run() is the sole caller and consumes
    // the executor, so Waiting → Running → terminal is enforced by control
    // flow.
    fn advance(&mut self, next: BuildState) {
        debug!(job_id = self.job.id, from = %self.state, to = %next, "state transition");
        self.state = next;
    }
}

/// The four environment variables every build script can rely on, on top of
/// the inherited parent environment.
fn ci_env(job: &BuildJob) -> Vec<(String, String)> {
    vec![
        ("CI_SERVER".to_string(), "yes".to_string()),
        ("CI_BUILD_REF".to_string(), job.commit_sha.clone()),
        ("CI_BUILD_REF_NAME".to_string(), job.ref_name.clone()),
        ("CI_BUILD_ID".to_string(), job.id.to_string()),
    ]
}
