/// Error types for bridge operations
use thiserror::Error;

use crate::adb::ParseError;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(
        "adb not found: {0}. Check that the Android platform tools are installed or point the bridge at the right executable"
    )]
    ToolNotFound(String),

    #[error("Command execution failed: `{command}`: {reason}")]
    Execution { command: String, reason: String },

    #[error("Failed to push file: {0}")]
    Transfer(String),

    #[error("No device connected")]
    NoDevice,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Can not connect to device: {device_id}")]
    DeviceUnreachable {
        device_id: String,
        #[source]
        source: Box<BridgeError>,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Command timeout: {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
