//! Control surface device trait
//!
//! Defines the interface for a grid-of-keys device with one small screen
//! per key.

use core::fmt;
use core::time::Duration;

use crate::format::KeyImageFormat;

/// Device transport errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The transport reported a failure (USB write/read error)
    Transport(String),
    /// Key index outside the device's key range
    InvalidKey(usize),
    /// Device handle already closed
    Closed,
    /// No supported device was found
    NotFound,
    /// Another user of the handle panicked while holding it
    Poisoned,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Transport(msg) => write!(f, "transport error: {msg}"),
            DeviceError::InvalidKey(key) => write!(f, "invalid key index {key}"),
            DeviceError::Closed => write!(f, "device handle closed"),
            DeviceError::NotFound => write!(f, "no visual device found"),
            DeviceError::Poisoned => write!(f, "device handle poisoned"),
        }
    }
}

impl std::error::Error for DeviceError {}

/// Control surface device
///
/// Identity and geometry queries are answered from values read when the
/// device was opened, so they cannot fail. Every other call talks to the
/// hardware and may fail with a [`DeviceError`].
pub trait DeckDevice: Send {
    /// Model name as reported by the device (e.g. "Stream Deck XL")
    fn model(&self) -> &str;

    /// Serial number, also used to tag key events
    fn serial_number(&self) -> &str;

    /// Firmware version string
    fn firmware_version(&self) -> &str;

    /// Total number of keys
    fn key_count(&self) -> usize;

    /// Physical key grid as (rows, columns)
    fn key_layout(&self) -> (usize, usize);

    /// Native image format of a single key
    fn image_format(&self) -> KeyImageFormat;

    /// Set the backlight brightness in percent (0-100)
    fn set_brightness(&mut self, percent: u8) -> Result<(), DeviceError>;

    /// Write an already-encoded native image to a physical key
    fn set_key_image(&mut self, key: usize, image: &[u8]) -> Result<(), DeviceError>;

    /// Reset the device, clearing every key image
    fn reset(&mut self) -> Result<(), DeviceError>;

    /// Close the device; further calls return [`DeviceError::Closed`]
    fn close(&mut self) -> Result<(), DeviceError>;

    /// Wait up to `timeout` for a key report
    ///
    /// Returns `Ok(Some(states))` with one pressed flag per physical key when
    /// a report arrived, `Ok(None)` when nothing changed.
    fn poll_keys(&mut self, timeout: Duration) -> Result<Option<Vec<bool>>, DeviceError>;
}
