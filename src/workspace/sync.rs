// src/workspace/sync.rs

use tracing::debug;

use crate::job::BuildJob;
use crate::workspace::Workspace;

/// Which synchronization path was chosen for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Fresh `git clone` followed by a checkout of the requested ref.
    Clone,
    /// In-place `git reset` / `git clean` / `git fetch` of an existing
    /// checkout.
    Fetch,
}

/// Decides clone-vs-fetch and renders the exact shell command sequence.
///
/// The decision reads the filesystem (does the checkout directory exist?)
/// but rendering has no side effects; the command string is executed later,
/// prepended to the job's own script.
pub struct SyncPlanner<'a> {
    workspace: &'a Workspace,
    job: &'a BuildJob,
}

impl<'a> SyncPlanner<'a> {
    pub fn new(workspace: &'a Workspace, job: &'a BuildJob) -> Self {
        Self { workspace, job }
    }

    /// Fetch iff the checkout already exists on disk **and** the job permits
    /// it; clone otherwise.
    pub fn mode(&self) -> SyncMode {
        if self.workspace.repo_dir().exists() && self.job.allow_git_fetch {
            SyncMode::Fetch
        } else {
            SyncMode::Clone
        }
    }

    /// Render the sync command for the chosen mode.
    pub fn command(&self) -> String {
        let mode = self.mode();
        debug!(job_id = self.job.id, ?mode, "planned source sync");
        match mode {
            SyncMode::Clone => self.clone_command(),
            SyncMode::Fetch => self.fetch_command(),
        }
    }

    /// `cd <project_dir> && git clone <url> <name> && cd <name> &&
    /// git checkout <ref>`.
    pub fn clone_command(&self) -> String {
        format!(
            "cd {dir} && git clone {url} {name} && cd {name} && git checkout {git_ref}",
            dir = self.workspace.project_dir().display(),
            url = self.job.repo_url,
            name = self.workspace.project_name(),
            git_ref = self.job.ref_name,
        )
    }

    /// `cd <project_dir> && cd <name> && git reset --hard && git clean -f &&
    /// git fetch`.
    ///
    /// Note: the fetch path does not check out the requested ref afterwards;
    /// the build runs whatever the checkout is left pointing at.
    pub fn fetch_command(&self) -> String {
        format!(
            "cd {dir} && cd {name} && git reset --hard && git clean -f && git fetch",
            dir = self.workspace.project_dir().display(),
            name = self.workspace.project_name(),
        )
    }
}
