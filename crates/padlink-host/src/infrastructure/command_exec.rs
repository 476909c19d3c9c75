//! Shell command execution for Command slots.
//!
//! When the device reports `CMD:<index>`, the session looks up the
//! locally-stored command text for that slot and hands it to a
//! [`CommandRunner`].  The trait is the seam to the OS process layer: the
//! production implementation spawns a detached shell, and tests substitute
//! a mock so no process is ever started.

use std::process::Command;

use thiserror::Error;
use tracing::info;

/// Error type for command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Trait abstracting process spawning.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send {
    /// Launches `command` for the given slot, without waiting for it.
    fn run(&self, slot: u8, command: &str) -> Result<(), CommandError>;
}

/// Production runner: hands the command line to the platform shell and
/// detaches.  Exit status is deliberately not observed; a macro key that
/// opens an editor should not tie up the session.
#[derive(Debug, Default)]
pub struct ShellCommandRunner;

impl CommandRunner for ShellCommandRunner {
    fn run(&self, slot: u8, command: &str) -> Result<(), CommandError> {
        info!(slot, command, "launching command");
        shell_command(command)
            .spawn()
            .map(|_| ())
            .map_err(|source| CommandError::Spawn {
                command: command.to_string(),
                source,
            })
    }
}

#[cfg(target_os = "windows")]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

#[cfg(not(target_os = "windows"))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
}
