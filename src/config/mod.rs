// src/config/mod.rs

//! Runner configuration loading and validation for cirun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like a sane timeout (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, RunnerSection, DEFAULT_TIMEOUT_SECS};
pub use validate::validate_config;
