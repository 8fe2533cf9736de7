//! Command channel to the module backend
//!
//! Every privileged operation is a shell string handed to a
//! [`CommandChannel`]. The production implementation is [`ShellChannel`],
//! which runs the string through `su -c` (or any configured prefix) and
//! returns the captured stdout.

use std::sync::Arc;

use async_trait::async_trait;
use protocol::{BackendCommand, ModulePaths, Outcome};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Runs a shell string and returns its standard output
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Execute `command`
    ///
    /// Succeeds with stdout when the command exits with status 0, fails with
    /// [`Error::Exec`] otherwise.
    async fn exec(&self, command: &str) -> Result<String>;
}

/// Channel that spawns a local process, e.g. `su -c <command>`
#[derive(Debug, Clone)]
pub struct ShellChannel {
    program: String,
    args: Vec<String>,
}

impl ShellChannel {
    /// Build a channel from a shell prefix such as `["su", "-c"]`
    pub fn new(prefix: &[String]) -> Result<Self> {
        let (program, args) = prefix
            .split_first()
            .ok_or_else(|| Error::Config("Shell prefix must not be empty".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Parse a whitespace separated prefix (`"su -c"`)
    pub fn from_prefix_str(prefix: &str) -> Result<Self> {
        let parts: Vec<String> = prefix.split_whitespace().map(str::to_string).collect();
        Self::new(&parts)
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl CommandChannel for ShellChannel {
    async fn exec(&self, command: &str) -> Result<String> {
        debug!("exec: {} {:?} {}", self.program, self.args, command);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(command)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| Error::Spawn {
                command: command.to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(Error::Exec {
                command: command.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Typed access to the module backend over a [`CommandChannel`]
#[derive(Clone)]
pub struct Backend {
    channel: Arc<dyn CommandChannel>,
    paths: ModulePaths,
}

impl Backend {
    pub fn new(channel: Arc<dyn CommandChannel>, paths: ModulePaths) -> Self {
        Self { channel, paths }
    }

    pub fn paths(&self) -> &ModulePaths {
        &self.paths
    }

    /// Run a command and return its stdout
    pub async fn run(&self, command: &BackendCommand) -> Result<String> {
        let shell = command.to_shell(&self.paths);
        if command.is_mutating() {
            info!("Running backend command: {}", shell);
        } else {
            debug!("Running backend query: {}", shell);
        }

        match self.channel.exec(&shell).await {
            Ok(output) => Ok(output),
            Err(e) => {
                if command.is_mutating() {
                    warn!("Backend command failed: {}", e);
                } else {
                    debug!("Backend query failed: {}", e);
                }
                Err(e)
            }
        }
    }

    /// Run a command and report whether it exited successfully
    ///
    /// Used for `grep -q` style probes, where a non-zero exit is an answer
    /// rather than a failure. Spawn errors still propagate.
    pub async fn probe(&self, command: &BackendCommand) -> Result<bool> {
        match self.run(command).await {
            Ok(_) => Ok(true),
            Err(Error::Exec { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Run a command and return its trimmed stdout
    pub async fn read(&self, command: &BackendCommand) -> Result<String> {
        self.run(command).await.map(|out| out.trim().to_string())
    }

    /// Run a command and scan its output for markers
    pub async fn run_marked(&self, command: &BackendCommand) -> Result<Vec<Outcome>> {
        let output = self.run(command).await?;
        Ok(Outcome::scan(&output))
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_channel_prefix() {
        let channel = ShellChannel::from_prefix_str("su -c").unwrap();
        assert_eq!(channel.program(), "su");
        assert_eq!(channel.args, vec!["-c".to_string()]);

        assert!(ShellChannel::from_prefix_str("   ").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_channel_captures_stdout() {
        let channel = ShellChannel::from_prefix_str("sh -c").unwrap();
        let out = channel.exec("echo hello").await.unwrap();
        assert_eq!(out, "hello\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_channel_reports_exit_code() {
        let channel = ShellChannel::from_prefix_str("sh -c").unwrap();
        let err = channel.exec("echo oops >&2; exit 3").await.unwrap_err();
        match err {
            Error::Exec { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "oops");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_shell_channel_spawn_failure() {
        let channel = ShellChannel::from_prefix_str("/nonexistent/bindhosts-shell -c").unwrap();
        let err = channel.exec("true").await.unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }
}
