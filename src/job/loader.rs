// src/job/loader.rs

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::job::model::BuildJob;

/// Load a job descriptor from a TOML file.
///
/// Performs deserialization plus the few semantic checks worth doing before
/// an executor ever exists: a blank `repo_url` or `commands` would only fail
/// later and more confusingly, inside a shell.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<BuildJob> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading job file at {:?}", path))?;

    let job: BuildJob = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML job descriptor from {:?}", path))?;

    if job.repo_url.trim().is_empty() {
        return Err(anyhow!("job {}: repo_url must not be empty", job.id));
    }
    if job.commands.trim().is_empty() {
        return Err(anyhow!("job {}: commands must not be empty", job.id));
    }
    if job.ref_name.trim().is_empty() {
        return Err(anyhow!("job {}: ref must not be empty", job.id));
    }

    Ok(job)
}
