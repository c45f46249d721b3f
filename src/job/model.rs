// src/job/model.rs

use serde::Deserialize;

/// One build request, as read from a TOML job file.
///
/// ```toml
/// id = 42
/// commit_sha = "d63c7f2f2f2a3b1c"
/// ref = "master"
/// repo_url = "https://example.com/group/name.git"
/// commands = """
/// bundle install
/// bundle exec rake test
/// """
/// allow_git_fetch = true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct BuildJob {
    /// Numeric job id; also names the project directory (`project-<id>`).
    pub id: u64,

    /// Commit the build is about; exported to the script as `CI_BUILD_REF`.
    pub commit_sha: String,

    /// Git ref to check out on a fresh clone; exported as
    /// `CI_BUILD_REF_NAME`.
    #[serde(rename = "ref")]
    pub ref_name: String,

    /// Repository URL handed verbatim to `git clone`.
    pub repo_url: String,

    /// The build script text. May use any line-ending convention; it is
    /// normalized to LF before execution.
    pub commands: String,

    /// Whether an existing checkout may be updated in place with
    /// `git fetch` instead of being cloned from scratch.
    #[serde(default)]
    pub allow_git_fetch: bool,
}
