// src/config/validate.rs

use anyhow::{anyhow, Result};

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `build_dir` is not empty
/// - `timeout >= 1`
/// - `run_as`, when present, is not empty or whitespace
/// - `shell` is an absolute path
///
/// It does **not** check that `build_dir` exists; the executor creates
/// per-job directories lazily under it.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    let runner = &cfg.runner;

    if runner.build_dir.as_os_str().is_empty() {
        return Err(anyhow!("[runner].build_dir must not be empty"));
    }

    if runner.timeout == 0 {
        return Err(anyhow!("[runner].timeout must be >= 1 (got 0)"));
    }

    if let Some(user) = &runner.run_as {
        if user.trim().is_empty() {
            return Err(anyhow!("[runner].run_as must not be empty when set"));
        }
    }

    if !runner.shell.starts_with('/') {
        return Err(anyhow!(
            "[runner].shell must be an absolute path (got '{}')",
            runner.shell
        ));
    }

    Ok(())
}
