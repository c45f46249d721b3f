// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running a composed build script,
//! using `tokio::process::Command`, under a hard deadline.
//!
//! - [`script`] composes the sync command and job script into one
//!   strict-shell program and persists it to a scratch file.
//! - [`command`] builds the `sh` / `su` invocation, streams the merged
//!   output, races it against the deadline (and an optional cancel signal),
//!   and reaps the child.

pub mod command;
pub mod script;

pub use command::{build_command, run_process, ProcessExit, ProcessSpec};
pub use script::{compose_script, write_script};
