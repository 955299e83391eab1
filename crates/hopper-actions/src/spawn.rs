//! Launching command lines.
//!
//! [`CommandSpawner`] is the seam the dispatcher launches through.
//! [`ShellSpawner`] splits the line with POSIX shell quoting rules and starts
//! the program directly (no shell), without waiting for it to exit.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use hopper_settings::SpawnSettings;
use tracing::{debug, warn};

use crate::errors::SpawnError;

/// Where and how a command is launched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchContext {
    /// Display to launch on (`DISPLAY`); inherited when `None`.
    pub display: Option<String>,
    /// Working directory; overrides the spawner's default when set.
    pub working_directory: Option<PathBuf>,
}

impl LaunchContext {
    /// Context targeting `display`.
    pub fn on_display(display: impl Into<String>) -> Self {
        Self {
            display: Some(display.into()),
            working_directory: None,
        }
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }
}

/// Starts a command line.
#[cfg_attr(test, mockall::automock)]
pub trait CommandSpawner: Send + Sync {
    /// Launch `command_line`; returns once the process has started.
    fn spawn(&self, command_line: &str, context: &LaunchContext) -> Result<(), SpawnError>;
}

/// Split a command line into argv.
pub fn parse_command_line(command_line: &str) -> Result<Vec<String>, SpawnError> {
    let argv = shlex::split(command_line).ok_or_else(|| SpawnError::Parse {
        command: command_line.to_owned(),
    })?;
    if argv.is_empty() {
        return Err(SpawnError::Empty);
    }
    Ok(argv)
}

/// Fire-and-forget process launcher.
#[derive(Debug, Clone)]
pub struct ShellSpawner {
    working_directory: Option<PathBuf>,
    inherit_display: bool,
}

impl Default for ShellSpawner {
    fn default() -> Self {
        Self {
            working_directory: None,
            inherit_display: true,
        }
    }
}

impl ShellSpawner {
    /// Spawner with no default working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawner configured from the `spawn` settings section.
    pub fn from_settings(settings: &SpawnSettings) -> Self {
        Self {
            working_directory: settings.working_directory.as_ref().map(PathBuf::from),
            inherit_display: settings.inherit_display,
        }
    }

    fn build(&self, argv: &[String], context: &LaunchContext) -> Result<Command, SpawnError> {
        let (program, args) = argv.split_first().ok_or(SpawnError::Empty)?;
        let mut cmd = Command::new(program);
        let _ = cmd
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if let Some(dir) = context
            .working_directory
            .as_ref()
            .or(self.working_directory.as_ref())
        {
            let _ = cmd.current_dir(dir);
        }
        match (&context.display, self.inherit_display) {
            (Some(display), _) => {
                let _ = cmd.env("DISPLAY", display);
            }
            (None, false) => {
                let _ = cmd.env_remove("DISPLAY");
            }
            (None, true) => {}
        }
        Ok(cmd)
    }
}

impl CommandSpawner for ShellSpawner {
    fn spawn(&self, command_line: &str, context: &LaunchContext) -> Result<(), SpawnError> {
        let argv = parse_command_line(command_line)?;
        let mut cmd = self.build(&argv, context)?;
        let program = argv[0].clone();

        let mut child = cmd.spawn().map_err(|source| SpawnError::Launch {
            program: program.clone(),
            source,
        })?;
        debug!(program = %program, pid = child.id(), args = argv.len() - 1, "spawned command");

        let reaper = std::thread::Builder::new()
            .name("hopper-reaper".into())
            .spawn(move || match child.wait() {
                Ok(status) => debug!(program = %program, %status, "command exited"),
                Err(error) => warn!(program = %program, %error, "failed to wait for command"),
            });
        if let Err(error) = reaper {
            warn!(%error, "failed to start reaper thread");
        }
        Ok(())
    }
}
