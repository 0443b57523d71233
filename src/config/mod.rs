// src/config/mod.rs

//! Configuration loading and validation for hotload.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate unit references and global settings (`validate.rs`).
//! - Resolve the feature toggles once at startup (`toggles.rs`).

pub mod loader;
pub mod model;
pub mod toggles;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    ConfigFile, ConfigSection, RawConfigFile, StepConfig, UnitConfig, WatchSection,
};
pub use toggles::{resolve_toggles, resolve_toggles_from_env};
