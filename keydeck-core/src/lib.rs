//! Board-agnostic core logic for the Keydeck switch panel
//!
//! This crate contains all logic that does not depend on a specific device
//! transport, image backend, or remote API:
//!
//! - Key index mapping under screen rotation
//! - Label text layout
//! - Button model and the remote switch seam
//! - Per-key style resolution
//! - Screen power / blanking state machine
//! - Render cache
//! - Configuration type definitions

#![deny(unsafe_code)]

pub mod button;
pub mod cache;
pub mod color;
pub mod config;
pub mod layout;
pub mod power;
pub mod style;
pub mod text;

pub use button::{Button, RemoteError, RemoteState, RemoteSwitch, SwitchSource};
pub use cache::{CacheKey, RenderCache};
pub use color::ColorSpec;
pub use config::{ConfigError, DeckConfig};
pub use layout::{KeyIndexMapper, LayoutError, Rotation};
pub use power::{has_brightness_quirk, PowerState, PressOutcome, RefreshMode, ScreenState};
pub use style::{Fetch, IconRef, IconTheme, KeyStyle, StyleResolver};
pub use text::{wrap_text, FontMetrics, TextLine};
