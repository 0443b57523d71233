// src/exec/shell.rs

//! Shell command helpers shared by command steps, hooks and process units.

use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::StepError;

/// Set to its own name in the environment of every spawned command, so
/// hosted code can tell it runs under hotload.
pub const RUNNING_ENV: &str = "HOTLOAD_RUNNING";

/// Build a shell command appropriate for the platform.
///
/// stdin is detached; stdout and stderr are inherited so the developer sees
/// the output directly. [`RUNNING_ENV`] is set.
pub fn shell_command(cmd: &str) -> Command {
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .env(RUNNING_ENV, RUNNING_ENV)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    command
}

/// Run `cmd` to completion and return its exit status.
///
/// Blocks the caller until the command exits; there is no timeout.
pub async fn run_to_completion(cmd: &str) -> Result<ExitStatus, StepError> {
    debug!(cmd = %cmd, "running shell command");

    let status = shell_command(cmd)
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|source| StepError::Spawn {
            cmd: cmd.to_string(),
            source,
        })?;

    info!(
        cmd = %cmd,
        exit_code = ?status.code(),
        success = status.success(),
        "command exited"
    );
    Ok(status)
}

/// Run `cmd` and turn a non-zero exit into [`StepError::CommandFailed`].
pub async fn run_checked(cmd: &str) -> Result<(), StepError> {
    let status = run_to_completion(cmd).await?;
    if status.success() {
        Ok(())
    } else {
        Err(StepError::CommandFailed {
            cmd: cmd.to_string(),
            code: status.code(),
        })
    }
}
