//! ADB (Android Debug Bridge) command-line wrapper
//!
//! This module provides:
//! - `client`: the [`AdbBridge`] that issues adb commands
//! - `parse`: parsers for adb text output
//! - `process`: handles for shell commands started in the background

mod client;
mod parse;
mod process;

pub use client::{AdbBridge, DeviceProperties};
pub use parse::{
    parse_devices, parse_properties, parse_push, parse_version, ParseError, VERSION_BANNER,
};
pub use process::ShellProcess;
