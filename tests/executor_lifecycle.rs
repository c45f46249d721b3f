use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cirun::build::{
    BuildExecutor, BuildListener, BuildState, EXIT_CANCELLED, EXIT_SETUP_FAILURE,
};
use cirun::config::RunnerSection;
use cirun::job::BuildJob;
use cirun::workspace::SyncMode;

type TestResult = Result<(), Box<dyn Error>>;

fn git(dir: &Path, args: &[&str]) -> Result<(), Box<dyn Error>> {
    let status = Command::new("git").args(args).current_dir(dir).status()?;
    if !status.success() {
        return Err(format!("git {:?} failed in {:?}", args, dir).into());
    }
    Ok(())
}

/// Create a tiny local repository the executor can clone from.
fn make_origin(root: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let origin = root.join("origin");
    fs::create_dir_all(&origin)?;
    git(&origin, &["init", "-q", "-b", "master"])?;
    fs::write(origin.join("README"), "hello\n")?;
    git(&origin, &["add", "."])?;
    git(
        &origin,
        &[
            "-c",
            "user.email=ci@example.com",
            "-c",
            "user.name=ci",
            "commit",
            "-q",
            "-m",
            "init",
        ],
    )?;
    Ok(origin)
}

fn runner(build_dir: &Path) -> RunnerSection {
    RunnerSection {
        build_dir: build_dir.to_path_buf(),
        run_as: None,
        shell: "/bin/bash".to_string(),
        timeout: 7200,
    }
}

fn job(origin: &Path, commands: &str, allow_fetch: bool) -> BuildJob {
    BuildJob {
        id: 7,
        commit_sha: "deadbeef".into(),
        ref_name: "master".into(),
        repo_url: origin.display().to_string(),
        commands: commands.into(),
        allow_git_fetch: allow_fetch,
    }
}

/// Records every callback it receives, tagged with the listener's name.
struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<(String, BuildState, i32)>>>,
}

impl BuildListener for Recorder {
    fn build_finished(&self, _job: &BuildJob, state: BuildState, _trace: &str, exit_code: i32) {
        self.log
            .lock()
            .unwrap()
            .push((self.name.to_string(), state, exit_code));
    }
}

#[tokio::test]
async fn successful_build_reports_success_and_notifies_in_order() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let origin = make_origin(tmp.path())?;
    let builds = tmp.path().join("builds");

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut executor = BuildExecutor::new(
        job(&origin, "echo building $CI_BUILD_ID on $CI_BUILD_REF_NAME", false),
        runner(&builds),
    );
    executor.add_listener(Box::new(Recorder {
        name: "first",
        log: Arc::clone(&log),
    }));
    executor.add_listener(Box::new(Recorder {
        name: "second",
        log: Arc::clone(&log),
    }));

    let result = executor.run().await;

    assert_eq!(result.state, BuildState::Success);
    assert!(result.state.is_terminal());
    assert_eq!(result.exit_code, 0);
    assert!(result.trace.contains("building 7 on master"));

    // Exactly one callback per listener, in registration order.
    let log = log.lock().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], ("first".to_string(), BuildState::Success, 0));
    assert_eq!(log[1], ("second".to_string(), BuildState::Success, 0));
    Ok(())
}

#[tokio::test]
async fn script_exit_code_is_reported_but_state_is_success() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let origin = make_origin(tmp.path())?;
    let builds = tmp.path().join("builds");

    let executor = BuildExecutor::new(job(&origin, "exit 7", false), runner(&builds));
    let result = executor.run().await;

    // The pipeline completed, so the state is Success; the script's own
    // verdict travels in the exit code.
    assert_eq!(result.state, BuildState::Success);
    assert_eq!(result.exit_code, 7);
    Ok(())
}

#[tokio::test]
async fn second_run_with_fetch_allowed_takes_the_fetch_path() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let origin = make_origin(tmp.path())?;
    let builds = tmp.path().join("builds");

    let first = BuildExecutor::new(job(&origin, "echo once", false), runner(&builds));
    assert_eq!(first.sync_mode(), SyncMode::Clone);
    let result = first.run().await;
    assert_eq!(result.state, BuildState::Success);
    assert_eq!(result.exit_code, 0);

    let second = BuildExecutor::new(job(&origin, "echo again", true), runner(&builds));
    assert_eq!(second.sync_mode(), SyncMode::Fetch);
    let result = second.run().await;
    assert_eq!(result.state, BuildState::Success);
    assert_eq!(result.exit_code, 0);
    assert!(result.trace.contains("again"));
    Ok(())
}

#[tokio::test]
async fn setup_failure_is_failed_with_synthetic_code() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let origin = make_origin(tmp.path())?;

    // A regular file where the build root should be makes project dir
    // creation fail before any script exists.
    let blocked = tmp.path().join("blocked");
    fs::write(&blocked, "")?;

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut executor = BuildExecutor::new(job(&origin, "echo never", false), runner(&blocked));
    executor.add_listener(Box::new(Recorder {
        name: "only",
        log: Arc::clone(&log),
    }));

    let result = executor.run().await;

    assert_eq!(result.state, BuildState::Failed);
    assert!(result.state.is_terminal());
    assert_eq!(result.exit_code, EXIT_SETUP_FAILURE);
    assert!(result.trace.is_empty());

    // Listeners are notified on failure too, exactly once.
    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(
        log[0],
        ("only".to_string(), BuildState::Failed, EXIT_SETUP_FAILURE)
    );
    Ok(())
}

#[tokio::test]
async fn failing_sync_still_completes_the_pipeline() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let builds = tmp.path().join("builds");

    let bad_origin = tmp.path().join("nowhere");
    let executor = BuildExecutor::new(job(&bad_origin, "echo never", false), runner(&builds));
    let result = executor.run().await;

    // The clone fails and `-e` aborts the script, but the pipeline itself
    // ran to completion: Success with the shell's nonzero code.
    assert_eq!(result.state, BuildState::Success);
    assert_ne!(result.exit_code, 0);
    assert!(!result.trace.contains("never"));
    Ok(())
}

#[tokio::test]
async fn timed_out_build_never_emits_late_output() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let origin = make_origin(tmp.path())?;
    let builds = tmp.path().join("builds");

    let mut executor = BuildExecutor::new(job(&origin, "sleep 5\necho done", false), runner(&builds));
    executor.set_timeout(Duration::from_secs(1));

    let result = executor.run().await;

    assert_eq!(result.state, BuildState::Success);
    assert_ne!(result.exit_code, 0);
    assert!(!result.trace.contains("done"));
    Ok(())
}

#[tokio::test]
async fn cancelled_run_terminates_in_cancelled() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let origin = make_origin(tmp.path())?;
    let builds = tmp.path().join("builds");

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut executor = BuildExecutor::new(job(&origin, "sleep 5\necho done", false), runner(&builds));
    executor.add_listener(Box::new(Recorder {
        name: "only",
        log: Arc::clone(&log),
    }));

    let cancel = executor.cancel_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.cancel();
    });

    let result = executor.run().await;

    assert_eq!(result.state, BuildState::Cancelled);
    assert!(result.state.is_terminal());
    assert_eq!(result.exit_code, EXIT_CANCELLED);
    assert!(!result.trace.contains("done"));

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(
        log[0],
        ("only".to_string(), BuildState::Cancelled, EXIT_CANCELLED)
    );
    Ok(())
}
