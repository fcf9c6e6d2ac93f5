//! Handle for shell commands started without waiting

use std::process::ExitStatus;
use tokio::process::Child;
use tracing::{debug, warn};

use crate::error::{BridgeError, Result};

/// A running `adb shell` command.
///
/// The handle must be consumed by [`wait`](Self::wait) or
/// [`kill`](Self::kill). Dropping it while the process may still be running
/// logs a warning, because the child is then left unreaped.
#[derive(Debug)]
#[must_use = "a spawned shell process must be waited on or killed"]
pub struct ShellProcess {
    child: Child,
    command: String,
    settled: bool,
}

impl ShellProcess {
    pub(crate) fn new(child: Child, command: String) -> Self {
        Self {
            child,
            command,
            settled: false,
        }
    }

    /// OS process id, `None` once the process has been reaped
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Command line that started the process
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Check for completion without blocking
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        let status = self.child.try_wait().map_err(|e| self.failure(e))?;
        if status.is_some() {
            self.settled = true;
        }
        Ok(status)
    }

    /// Wait for the process to exit and return its status
    pub async fn wait(mut self) -> Result<ExitStatus> {
        let status = self.child.wait().await.map_err(|e| self.failure(e))?;
        self.settled = true;
        debug!("`{}` exited with {}", self.command, status);
        Ok(status)
    }

    /// Terminate the process and reap it
    pub async fn kill(mut self) -> Result<()> {
        self.child.kill().await.map_err(|e| self.failure(e))?;
        self.settled = true;
        debug!("Killed `{}`", self.command);
        Ok(())
    }

    fn failure(&self, err: std::io::Error) -> BridgeError {
        BridgeError::Execution {
            command: self.command.clone(),
            reason: err.to_string(),
        }
    }
}

impl Drop for ShellProcess {
    fn drop(&mut self) {
        if !self.settled {
            warn!(
                "Shell process `{}` (pid {:?}) dropped without being waited on",
                self.command,
                self.child.id()
            );
        }
    }
}
