// src/job/mod.rs

//! Job descriptor: the immutable record describing one build request.
//!
//! - [`model`] defines the TOML-backed `BuildJob` struct.
//! - [`loader`] reads and checks a job file from disk.
//!
//! The descriptor is supplied once and never mutated by the executor; how it
//! got onto disk (poller, webhook, a human) is somebody else's problem.

pub mod loader;
pub mod model;

pub use loader::load_from_path;
pub use model::BuildJob;
