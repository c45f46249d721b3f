// src/workspace/mod.rs

//! Working-copy layout and source synchronization planning.
//!
//! - [`paths`] derives the per-job directory layout (project dir, checkout
//!   dir, safe project name) once, at executor construction.
//! - [`sync`] decides between a fresh `git clone` and an in-place
//!   `git fetch` update, and renders the exact command string.
//!
//! Nothing here runs git; the rendered command is executed together with the
//! job's own script by the `exec` layer.

pub mod paths;
pub mod sync;

pub use paths::{safe_project_name, Workspace};
pub use sync::{SyncMode, SyncPlanner};
