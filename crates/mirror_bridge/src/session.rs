//! Mirroring sessions bound to a single device

use std::process::ExitStatus;
use tracing::info;

use crate::adb::{AdbBridge, DeviceProperties, ShellProcess};
use crate::error::{BridgeError, Result};

/// Which device a session should attach to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceSelector {
    /// Use the first device adb lists
    #[default]
    AutoSelectFirst,
    /// Use the given serial without looking it up
    Explicit(String),
}

impl DeviceSelector {
    /// Build a selector from a list of serials given by a user.
    ///
    /// Fails when more than one serial is supplied.
    pub fn from_serials<S: AsRef<str>>(serials: &[S]) -> Result<Self> {
        match serials {
            [] => Ok(Self::AutoSelectFirst),
            [serial] => Ok(Self::Explicit(serial.as_ref().to_string())),
            _ => Err(BridgeError::InvalidArgument(
                "only one serial number is allowed".to_string(),
            )),
        }
    }
}

impl From<Option<String>> for DeviceSelector {
    fn from(serial: Option<String>) -> Self {
        serial.map_or(Self::AutoSelectFirst, Self::Explicit)
    }
}

/// A device resolved for mirroring.
///
/// The device identifier and its properties are fixed when the session is
/// opened. The running process and codec are filled in by whatever drives
/// the stream.
#[derive(Debug)]
pub struct MirrorSession {
    device_id: String,
    properties: DeviceProperties,
    process: Option<ShellProcess>,
    codec: Option<String>,
}

impl MirrorSession {
    /// Resolve a device and fetch its properties
    pub async fn open(bridge: &AdbBridge, selector: DeviceSelector) -> Result<Self> {
        bridge.verify().await?;

        let device_id = match selector {
            DeviceSelector::Explicit(id) => id,
            DeviceSelector::AutoSelectFirst => bridge
                .list_devices()
                .await?
                .into_iter()
                .next()
                .ok_or(BridgeError::NoDevice)?,
        };

        let properties = bridge
            .device_properties(&device_id)
            .await
            .map_err(|e| BridgeError::DeviceUnreachable {
                device_id: device_id.clone(),
                source: Box::new(e),
            })?;

        info!(
            "Opened session for {} ({} / {})",
            device_id, properties.product_name, properties.model
        );

        Ok(Self {
            device_id,
            properties,
            process: None,
            codec: None,
        })
    }

    /// Open a session from zero or one user-supplied serials.
    ///
    /// The serial count is checked before adb is touched.
    pub async fn open_serials<S: AsRef<str>>(bridge: &AdbBridge, serials: &[S]) -> Result<Self> {
        let selector = DeviceSelector::from_serials(serials)?;
        Self::open(bridge, selector).await
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    pub fn codec(&self) -> Option<&str> {
        self.codec.as_deref()
    }

    pub fn set_codec(&mut self, codec: impl Into<String>) {
        self.codec = Some(codec.into());
    }

    pub fn process(&self) -> Option<&ShellProcess> {
        self.process.as_ref()
    }

    /// Attach a running process, returning the one it replaces
    pub fn attach_process(&mut self, process: ShellProcess) -> Option<ShellProcess> {
        self.process.replace(process)
    }

    /// Detach the running process, if any
    pub fn take_process(&mut self) -> Option<ShellProcess> {
        self.process.take()
    }

    /// Wait for the attached process to exit. Returns `None` when nothing is attached.
    pub async fn wait_process(&mut self) -> Result<Option<ExitStatus>> {
        match self.process.take() {
            Some(process) => process.wait().await.map(Some),
            None => Ok(None),
        }
    }
}
