//! Fake adb executable for process-level tests

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::adb::AdbBridge;
use crate::config::BridgeConfig;

/// Builder for a shell script that answers adb subcommands with canned output.
///
/// Every invocation is appended to `calls.log` next to the script. `shell`
/// commands other than `getprop` are executed locally with `sh -c`.
pub(crate) struct FakeAdb {
    version: (String, i32),
    devices: String,
    devices_delay: u32,
    getprop: (String, i32),
    push: (String, i32),
    forward_exit: i32,
}

pub(crate) struct InstalledAdb {
    dir: TempDir,
    path: PathBuf,
}

impl FakeAdb {
    pub fn new() -> Self {
        Self {
            version: (
                "Android Debug Bridge version 1.0.41\nVersion 34.0.5-10900879".to_string(),
                0,
            ),
            devices: "List of devices attached\nA1\tdevice".to_string(),
            devices_delay: 0,
            getprop: (
                "[ro.product.name]: panther\n[ro.product.model]: Pixel 7".to_string(),
                0,
            ),
            push: ("1 file pushed, 0 skipped.".to_string(), 0),
            forward_exit: 0,
        }
    }

    pub fn version(mut self, output: &str, exit: i32) -> Self {
        self.version = (output.to_string(), exit);
        self
    }

    pub fn devices(mut self, output: &str) -> Self {
        self.devices = output.to_string();
        self
    }

    pub fn devices_delay(mut self, secs: u32) -> Self {
        self.devices_delay = secs;
        self
    }

    pub fn getprop(mut self, output: &str, exit: i32) -> Self {
        self.getprop = (output.to_string(), exit);
        self
    }

    pub fn push(mut self, output: &str, exit: i32) -> Self {
        self.push = (output.to_string(), exit);
        self
    }

    pub fn forward_exit(mut self, exit: i32) -> Self {
        self.forward_exit = exit;
        self
    }

    pub fn install(self) -> InstalledAdb {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adb");

        let script = format!(
            r#"#!/bin/sh
echo "$*" >> "$(dirname "$0")/calls.log"
if [ "$1" = "-s" ]; then shift 2; fi
case "$1" in
  version)
    cat <<'__OUT__'
{version}
__OUT__
    exit {version_exit} ;;
  devices)
    sleep {devices_delay}
    cat <<'__OUT__'
{devices}
__OUT__
    exit 0 ;;
  push)
    cat <<'__OUT__'
{push}
__OUT__
    exit {push_exit} ;;
  forward)
    exit {forward_exit} ;;
  shell)
    if [ "$2" = "getprop" ]; then
      cat <<'__OUT__'
{getprop}
__OUT__
      exit {getprop_exit}
    fi
    shift
    exec sh -c "$*" ;;
esac
exit 1
"#,
            version = self.version.0,
            version_exit = self.version.1,
            devices_delay = self.devices_delay,
            devices = self.devices,
            push = self.push.0,
            push_exit = self.push.1,
            forward_exit = self.forward_exit,
            getprop = self.getprop.0,
            getprop_exit = self.getprop.1,
        );

        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        InstalledAdb { dir, path }
    }
}

impl InstalledAdb {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bridge(&self) -> AdbBridge {
        AdbBridge::with_config(BridgeConfig::new().with_adb_path(&self.path))
    }

    /// Argument lists of every invocation so far, in order
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}
