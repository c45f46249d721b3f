// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Default build timeout in seconds (two hours).
pub const DEFAULT_TIMEOUT_SECS: u64 = 7200;

/// Top-level runner configuration as read from a TOML file.
///
/// ```toml
/// [runner]
/// build_dir = "/var/lib/cirun/builds"
/// run_as = "builder"
/// shell = "/bin/bash"
/// timeout = 7200
/// ```
///
/// All keys except `build_dir` are optional and have defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Runner behaviour from `[runner]`.
    #[serde(default)]
    pub runner: RunnerSection,
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// Root directory under which per-job project directories are created
    /// (`<build_dir>/project-<id>`).
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Optional user to run builds as, via `su -c`.
    ///
    /// If unset, build scripts run directly as the current user.
    #[serde(default)]
    pub run_as: Option<String>,

    /// Shell handed to `su -s` when `run_as` is set.
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Hard ceiling on build wall-clock duration, in seconds.
    ///
    /// An overrunning build subprocess is killed, not asked politely.
    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("builds")
}

fn default_shell() -> String {
    "/bin/bash".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
            run_as: None,
            shell: default_shell(),
            timeout: default_timeout_secs(),
        }
    }
}
