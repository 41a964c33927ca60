//! Configuration type definitions
//!
//! Every section and field is optional in the file; missing values take the
//! defaults below.

use core::fmt;

use crate::color::ColorSpec;
use crate::layout::{LayoutError, Rotation};
use crate::style::{has_prefix, GLYPH_PREFIX, IMAGE_PREFIX};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default backlight brightness in percent
pub const DEFAULT_BRIGHTNESS: u8 = 30;

/// Default idle timeout in seconds
pub const DEFAULT_TIMEOUT_S: i64 = 60;

/// Default label font height in pixels
pub const DEFAULT_FONT_SIZE: u32 = 14;

/// Default monitoring port
pub const DEFAULT_MONITOR_PORT: u16 = 8080;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File could not be read
    Io(String),
    /// TOML syntax or type error
    Parse(String),
    /// Rotation is not a right angle
    InvalidRotation(i32),
    /// Brightness above 100 percent
    InvalidBrightness(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "cannot read config: {msg}"),
            ConfigError::Parse(msg) => write!(f, "cannot parse config: {msg}"),
            ConfigError::InvalidRotation(deg) => {
                write!(f, "invalid rotation value {deg}, must be 0, 90, 180 or 270")
            }
            ConfigError::InvalidBrightness(pct) => {
                write!(f, "invalid brightness {pct}, must be 0-100")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<LayoutError> for ConfigError {
    fn from(e: LayoutError) -> Self {
        match e {
            LayoutError::InvalidRotation(deg) => ConfigError::InvalidRotation(deg),
            // Grid size never comes from the config file
            LayoutError::EmptyGrid => ConfigError::Parse(e.to_string()),
        }
    }
}

/// Complete daemon configuration
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeckConfig {
    pub homeassistant: HomeAssistantConfig,
    pub font: FontConfig,
    pub screen: ScreenConfig,
    pub icon: IconConfig,
}

impl DeckConfig {
    /// Check value ranges and return the normalized rotation
    pub fn validate(&self) -> Result<Rotation, ConfigError> {
        if self.screen.brightness > 100 {
            return Err(ConfigError::InvalidBrightness(self.screen.brightness));
        }
        Ok(Rotation::from_degrees(self.screen.rotation)?)
    }
}

/// Remote switch service
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HomeAssistantConfig {
    /// Base URL of the REST API
    pub url: Option<String>,
    /// Long-lived access token
    pub token: Option<String>,
    /// One entry per key, in logical order
    pub entities: Vec<String>,
    pub monitoring: MonitoringConfig,
}

impl HomeAssistantConfig {
    /// URL and token, when both are set and non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let url = self.url.as_deref().filter(|u| !u.is_empty())?;
        let token = self.token.as_deref().filter(|t| !t.is_empty())?;
        Some((url, token))
    }
}

/// Status endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: DEFAULT_MONITOR_PORT,
        }
    }
}

/// Label font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FontFace {
    #[default]
    Regular,
    Bold,
}

/// Label font
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FontConfig {
    pub face: FontFace,
    /// Pixel height
    pub size: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            face: FontFace::Regular,
            size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Screen behavior
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScreenConfig {
    /// Backlight brightness in percent
    pub brightness: u8,
    /// Idle seconds before blanking; zero or less disables blanking
    pub timeout: i64,
    /// Whole-screen rotation in degrees
    pub rotation: i32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
            timeout: DEFAULT_TIMEOUT_S,
            rotation: 0,
        }
    }
}

/// Icon assets
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IconConfig {
    /// Directory icon file names resolve against
    pub assets: String,
    pub color: IconColors,
    pub image: IconImages,
    pub glyph: GlyphConfig,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            assets: "Assets".into(),
            color: IconColors::default(),
            image: IconImages::default(),
            glyph: GlyphConfig::default(),
        }
    }
}

/// Tint per role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IconColors {
    pub on: ColorSpec,
    pub off: ColorSpec,
    pub blank: ColorSpec,
}

impl Default for IconColors {
    fn default() -> Self {
        Self {
            on: ColorSpec::rgb(0xFF, 0xFF, 0xFF),
            off: ColorSpec::rgb(0x77, 0x77, 0x77),
            blank: ColorSpec::rgb(0x55, 0x55, 0x55),
        }
    }
}

/// Image file per role
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IconImages {
    pub on: String,
    pub off: String,
    pub blank: String,
}

impl Default for IconImages {
    fn default() -> Self {
        Self {
            on: "On.png".into(),
            off: "Off.png".into(),
            blank: "Blank.png".into(),
        }
    }
}

/// Glyph icons; both fields are required to enable them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GlyphConfig {
    /// Stylesheet with the glyph mapping, relative to the assets directory
    pub css: Option<String>,
    /// TrueType glyph font, relative to the assets directory
    pub face: Option<String>,
}

/// What a configured entity entry turns into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityBinding<'a> {
    /// Decorative icon without a switch
    Decoration(&'a str),
    /// Remote switch entity
    Remote { entity: &'a str, url: &'a str, token: &'a str },
    /// Unused key
    Empty,
}

impl<'a> EntityBinding<'a> {
    /// Classify an entity entry
    ///
    /// `mdi:` and `image:` entries are decorations. Anything else is a remote
    /// switch when credentials are configured, otherwise an empty key.
    pub fn parse(entry: &'a str, credentials: Option<(&'a str, &'a str)>) -> Self {
        if entry.is_empty() {
            return EntityBinding::Empty;
        }
        if has_prefix(entry, GLYPH_PREFIX) || has_prefix(entry, IMAGE_PREFIX) {
            return EntityBinding::Decoration(entry);
        }
        match credentials {
            Some((url, token)) => EntityBinding::Remote {
                entity: entry,
                url,
                token,
            },
            None => EntityBinding::Empty,
        }
    }
}
