// src/workspace/paths.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::job::BuildJob;

/// Per-job working-copy layout.
///
/// All three values are derived exactly once, when the executor is
/// constructed, and are immutable for the lifetime of the run. An executor
/// instance is owned by a single driving task, so no synchronization is
/// needed.
///
/// Layout on disk:
/// - `project_dir = <build_dir>/project-<id>`
/// - `repo_dir    = <project_dir>/<project_name>`
#[derive(Debug, Clone)]
pub struct Workspace {
    project_dir: PathBuf,
    repo_dir: PathBuf,
    project_name: String,
}

impl Workspace {
    /// Derive the layout for a job under the given build root.
    pub fn new(build_dir: &Path, job: &BuildJob) -> Self {
        let project_name = safe_project_name(&job.repo_url);
        let project_dir = build_dir.join(format!("project-{}", job.id));
        let repo_dir = project_dir.join(&project_name);
        Self {
            project_dir,
            repo_dir,
            project_name,
        }
    }

    /// Directory the build script runs in; parent of the checkout.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// The git checkout directory (`project_dir/<project_name>`).
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Directory-safe name derived from the repository URL.
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Create the project directory if it does not exist yet.
    ///
    /// Idempotent; called once per run before anything touches the disk.
    pub fn ensure_project_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.project_dir)
            .with_context(|| format!("creating project directory {:?}", self.project_dir))
    }
}

/// Derive a name usable as a directory name from a repository URL: the
/// substring between the last `/` and the last `.`.
///
/// `https://example.com/group/name.git` becomes `name`. URLs without an
/// extension after the last `/` keep the whole trailing segment.
pub fn safe_project_name(repo_url: &str) -> String {
    let tail = match repo_url.rfind('/') {
        Some(pos) => &repo_url[pos + 1..],
        None => repo_url,
    };
    match tail.rfind('.') {
        Some(pos) if pos > 0 => tail[..pos].to_string(),
        _ => tail.to_string(),
    }
}
