// src/errors.rs

//! Crate-wide error aliases.
//!
//! Currently a thin wrapper around `anyhow`; having the module gives a single
//! place to introduce more structured error types later. Note that a build
//! *run* never surfaces errors this way — every failure inside a run is
//! folded into a terminal state plus a synthetic exit code (see
//! `build::executor`).

pub use anyhow::{Error, Result};
