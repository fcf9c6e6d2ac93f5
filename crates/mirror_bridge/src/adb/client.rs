//! ADB command-line client

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output, Stdio};
use tokio::process::Command;
use tracing::debug;

use super::parse::{self, VERSION_BANNER};
use super::process::ShellProcess;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};

/// Identity of a device as reported by `getprop`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceProperties {
    pub device_id: String,
    /// Value of `ro.product.name`, empty when absent
    pub product_name: String,
    /// Value of `ro.product.model`, empty when absent
    pub model: String,
}

/// Runs adb commands against a configured executable and parses their output
#[derive(Debug, Clone)]
pub struct AdbBridge {
    config: BridgeConfig,
}

impl AdbBridge {
    /// Create a bridge using `adb` from `PATH`
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    /// Create a bridge with an explicit configuration
    pub fn with_config(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// Create a bridge configured from the environment
    pub fn from_env() -> Self {
        Self::with_config(BridgeConfig::from_env())
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn adb_path(&self) -> &Path {
        &self.config.adb_path
    }

    /// Point the bridge at another adb executable and verify it.
    ///
    /// The new path is kept even when verification fails.
    pub async fn set_adb_path(&mut self, path: impl Into<PathBuf>) -> Result<String> {
        self.config.adb_path = path.into();
        self.verify().await
    }

    /// Check that the configured executable is adb, returning its banner line
    pub async fn verify(&self) -> Result<String> {
        let mut cmd = self.command(None);
        cmd.arg("version");

        let output = self.capture(cmd).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        match parse::parse_version(&stdout) {
            Some(banner) => {
                debug!("Using {}: {}", self.config.adb_path.display(), banner);
                Ok(banner.to_string())
            }
            None => Err(BridgeError::ToolNotFound(format!(
                "`{} version` did not print \"{}\"",
                self.config.adb_path.display(),
                VERSION_BANNER
            ))),
        }
    }

    /// List identifiers of connected, authorized devices in the order adb reports them
    pub async fn list_devices(&self) -> Result<Vec<String>> {
        let mut cmd = self.command(None);
        cmd.arg("devices");

        let output = self.capture(cmd).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let devices = parse::parse_devices(&stdout);

        debug!("Found {} device(s): {:?}", devices.len(), devices);
        Ok(devices)
    }

    /// Read product name and model of a device
    pub async fn device_properties(&self, device_id: &str) -> Result<DeviceProperties> {
        let mut cmd = self.command(Some(device_id));
        cmd.arg("shell").arg("getprop");

        let output = self.capture(cmd).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let properties = parse::parse_properties(device_id, &stdout)?;

        debug!("Properties of {}: {:?}", device_id, properties);
        Ok(properties)
    }

    /// Copy a local file onto the device
    pub async fn push(&self, device_id: &str, local: impl AsRef<Path>, remote: &str) -> Result<()> {
        let local = local.as_ref();
        let mut cmd = self.command(Some(device_id));
        cmd.arg("push").arg(local).arg(remote);

        let output = self.capture(cmd).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        match parse::parse_push(&stdout) {
            Some(summary) => {
                debug!("{}", summary);
                Ok(())
            }
            None => Err(BridgeError::Transfer(format!(
                "{} -> {}:{}: {}",
                local.display(),
                device_id,
                remote,
                stdout.trim()
            ))),
        }
    }

    /// Forward a local socket to a device socket, e.g. `tcp:27183` to `localabstract:scrcpy`
    pub async fn forward(&self, device_id: &str, local: &str, remote: &str) -> Result<()> {
        let mut cmd = self.command(Some(device_id));
        cmd.arg("forward").arg(local).arg(remote);

        self.capture(cmd).await?;
        Ok(())
    }

    /// Remove a forward previously set up with [`forward`](Self::forward)
    pub async fn remove_forward(&self, device_id: &str, local: &str) -> Result<()> {
        let mut cmd = self.command(Some(device_id));
        cmd.arg("forward").arg("--remove").arg(local);

        self.capture(cmd).await?;
        Ok(())
    }

    /// Run a shell command on the device and wait for it to finish.
    ///
    /// Output is discarded; only the exit status is checked.
    pub async fn run_shell(&self, device_id: &str, command: &str) -> Result<()> {
        let process = self.spawn_shell(device_id, command).await?;
        let command_line = process.command().to_string();
        let status = process.wait().await?;

        if status.success() {
            Ok(())
        } else {
            Err(BridgeError::Execution {
                command: command_line,
                reason: exit_reason(status, ""),
            })
        }
    }

    /// Start a shell command on the device without waiting for it
    pub async fn spawn_shell(&self, device_id: &str, command: &str) -> Result<ShellProcess> {
        let mut cmd = self.command(Some(device_id));
        cmd.arg("shell")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let command_line = describe(&cmd);
        debug!("Spawning {}", command_line);

        let child = cmd.spawn().map_err(|e| BridgeError::Execution {
            command: command_line.clone(),
            reason: e.to_string(),
        })?;

        Ok(ShellProcess::new(child, command_line))
    }

    /// Build an adb command with optional device specifier
    fn command(&self, device_id: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.config.adb_path);
        if let Some(id) = device_id {
            cmd.arg("-s").arg(id);
        }
        cmd
    }

    /// Run a command to completion, capturing its output. A non-zero exit is an error.
    async fn capture(&self, mut cmd: Command) -> Result<Output> {
        let command_line = describe(&cmd);
        debug!("Running {}", command_line);

        cmd.stdin(Stdio::null()).kill_on_drop(true);

        let output = match self.config.command_timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| {
                    BridgeError::Timeout(format!("`{}` timed out after {:?}", command_line, limit))
                })?,
            None => cmd.output().await,
        }
        .map_err(|e| BridgeError::Execution {
            command: command_line.clone(),
            reason: e.to_string(),
        })?;

        debug!("`{}` exited with {}", command_line, output.status);
        debug!(
            "`{}` output: {}{}",
            command_line,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BridgeError::Execution {
                command: command_line,
                reason: exit_reason(output.status, &stderr),
            });
        }

        Ok(output)
    }
}

impl Default for AdbBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a command as a single line for logs and errors
fn describe(cmd: &Command) -> String {
    let cmd = cmd.as_std();
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

fn exit_reason(status: ExitStatus, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", status)
    } else {
        format!("exited with {}: {}", status, stderr)
    }
}
