// src/build/mod.rs

//! Build orchestration: lifecycle state, trace capture, and the executor
//! that ties workspace sync, script execution and listener notification
//! together.
//!
//! - [`state`] is the monotonic lifecycle state machine.
//! - [`trace`] is the append-only captured output of a run.
//! - [`executor`] owns one run end to end and fires exactly one
//!   notification cycle when it concludes.

pub mod executor;
pub mod state;
pub mod trace;

pub use executor::{
    BuildExecutor, BuildListener, BuildResult, CancelHandle, EXIT_CANCELLED, EXIT_SETUP_FAILURE,
};
pub use state::BuildState;
pub use trace::Trace;
