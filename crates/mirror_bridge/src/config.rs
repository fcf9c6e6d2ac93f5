//! Bridge configuration

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Executable used when no path is configured, resolved through `PATH`
pub const DEFAULT_ADB_PATH: &str = "adb";

/// Environment variable overriding the adb executable path
pub const ADB_PATH_ENV: &str = "MIRROR_ADB_PATH";

/// Environment variable holding a per-command timeout in seconds
pub const COMMAND_TIMEOUT_ENV: &str = "MIRROR_COMMAND_TIMEOUT";

/// Configuration owned by a single [`AdbBridge`](crate::AdbBridge)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub adb_path: PathBuf,
    /// Upper bound for commands whose output is captured. `None` waits forever.
    pub command_timeout: Option<Duration>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            adb_path: PathBuf::from(DEFAULT_ADB_PATH),
            command_timeout: None,
        }
    }
}

impl BridgeConfig {
    /// Create a config with the default adb path and no timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from `MIRROR_ADB_PATH` and `MIRROR_COMMAND_TIMEOUT`
    pub fn from_env() -> Self {
        Self {
            adb_path: env::var_os(ADB_PATH_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ADB_PATH)),
            command_timeout: env::var(COMMAND_TIMEOUT_ENV)
                .ok()
                .and_then(|v| parse_timeout(&v)),
        }
    }

    /// Set the adb executable path
    pub fn with_adb_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.adb_path = path.into();
        self
    }

    /// Set the timeout applied to captured commands
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }
}

/// Parse a timeout given in (fractional) seconds. Zero, negative and
/// unparsable values mean "no timeout".
pub fn parse_timeout(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}
