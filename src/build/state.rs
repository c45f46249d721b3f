// src/build/state.rs

use std::fmt;

/// Lifecycle state of a build run.
///
/// Transitions are monotonic and single-directional:
/// `Waiting → Running → {Success, Failed, Cancelled}`. No state is ever
/// revisited; the executor consumes itself on `run`, so a terminal state is
/// final by construction.
///
/// `Success` means "the build pipeline completed" — the script was spawned,
/// its output drained and its exit code obtained. It does *not* imply the
/// script exited zero; the numeric exit code is reported alongside the state
/// so listeners can tell script failure from infrastructure failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Constructed, not yet started.
    Waiting,
    /// Sync + script execution in progress.
    Running,
    /// Pipeline completed; exit code carries the script's verdict.
    Success,
    /// Setup/IO failure before or while launching the script.
    Failed,
    /// Killed by an external cancel signal before completing.
    Cancelled,
}

impl BuildState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BuildState::Success | BuildState::Failed | BuildState::Cancelled
        )
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildState::Waiting => "waiting",
            BuildState::Running => "running",
            BuildState::Success => "success",
            BuildState::Failed => "failed",
            BuildState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}
