// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything that spawns an OS process goes through [`shell`], using
//! `tokio::process::Command`:
//! - `Command` pipeline steps and command hooks run to completion,
//! - process units are spawned and kept running by
//!   [`crate::unit::ProcessUnitRegistry`].

pub mod shell;

pub use shell::{run_checked, run_to_completion, shell_command, RUNNING_ENV};
