// src/exec/script.rs

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::{Builder, NamedTempFile};

/// Join the rendered sync command and the job's script text into a single
/// strict-shell program: `<sync> && <commands>`.
///
/// Job command text may arrive with any line-ending convention (editors,
/// web forms); it is normalized to LF so `sh` sees one statement per line.
pub fn compose_script(sync_command: &str, commands: &str) -> String {
    format!("{} && {}", sync_command, normalize_newlines(commands))
}

fn normalize_newlines(commands: &str) -> String {
    commands.replace("\r\n", "\n").replace('\r', "\n")
}

/// Persist a composed script to `build-<random>.sh` inside the project
/// directory.
///
/// The returned guard keeps the file alive; dropping it removes the script.
/// Callers hold the guard for the duration of the run so cleanup happens on
/// every exit path — normal completion, setup error, or cancellation.
pub fn write_script(project_dir: &Path, contents: &str) -> Result<NamedTempFile> {
    let mut file = Builder::new()
        .prefix("build-")
        .suffix(".sh")
        .tempfile_in(project_dir)
        .with_context(|| format!("creating build script in {:?}", project_dir))?;

    file.write_all(contents.as_bytes())
        .context("writing build script")?;
    file.flush().context("flushing build script")?;

    Ok(file)
}
