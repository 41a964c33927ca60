//! Startup errors

use core::fmt;
use std::io;

use embassy_executor::SpawnError;
use keydeck_core::ConfigError;
use keydeck_display::{DriverError, GlyphFontError, GlyphMapError};
use keydeck_hal::DeviceError;

/// Anything that stops the daemon from starting
#[derive(Debug)]
pub enum SetupError {
    Config(ConfigError),
    GlyphFont(GlyphFontError),
    Glyphs(GlyphMapError),
    Device(DeviceError),
    Driver(DriverError),
    /// Thread or socket setup failed
    Io(io::Error),
    /// Executor out of task slots
    Spawn(SpawnError),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::Config(e) => write!(f, "{e}"),
            SetupError::GlyphFont(e) => write!(f, "{e}"),
            SetupError::Glyphs(e) => write!(f, "{e}"),
            SetupError::Device(e) => write!(f, "{e}"),
            SetupError::Driver(e) => write!(f, "{e}"),
            SetupError::Io(e) => write!(f, "{e}"),
            SetupError::Spawn(e) => write!(f, "cannot spawn task: {e:?}"),
        }
    }
}

impl std::error::Error for SetupError {}

impl From<ConfigError> for SetupError {
    fn from(e: ConfigError) -> Self {
        SetupError::Config(e)
    }
}

impl From<GlyphFontError> for SetupError {
    fn from(e: GlyphFontError) -> Self {
        SetupError::GlyphFont(e)
    }
}

impl From<GlyphMapError> for SetupError {
    fn from(e: GlyphMapError) -> Self {
        SetupError::Glyphs(e)
    }
}

impl From<DeviceError> for SetupError {
    fn from(e: DeviceError) -> Self {
        SetupError::Device(e)
    }
}

impl From<DriverError> for SetupError {
    fn from(e: DriverError) -> Self {
        SetupError::Driver(e)
    }
}

impl From<io::Error> for SetupError {
    fn from(e: io::Error) -> Self {
        SetupError::Io(e)
    }
}
