//! mirror_bridge: ADB command-line wrapper for screen-mirroring tools
//!
//! This library shells out to a pre-installed `adb` executable:
//! - Device discovery and property lookup
//! - File push and port forwarding
//! - Remote shell commands, blocking or in the background
//! - Mirroring sessions bound to one resolved device
//!
//! # Example
//!
//! ```no_run
//! use mirror_bridge::{AdbBridge, DeviceSelector, MirrorSession};
//!
//! #[tokio::main]
//! async fn main() -> mirror_bridge::Result<()> {
//!     let bridge = AdbBridge::from_env();
//!     let session = MirrorSession::open(&bridge, DeviceSelector::AutoSelectFirst).await?;
//!
//!     bridge
//!         .forward(session.device_id(), "tcp:27183", "localabstract:scrcpy")
//!         .await?;
//!     println!("{:?}", session.properties());
//!     Ok(())
//! }
//! ```

pub mod adb;
pub mod config;
pub mod error;
pub mod session;

#[cfg(all(test, unix))]
mod testing;

pub use adb::{AdbBridge, DeviceProperties, ParseError, ShellProcess};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use session::{DeviceSelector, MirrorSession};
