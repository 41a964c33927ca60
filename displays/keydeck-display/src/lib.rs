//! Key image rendering and the device driver for Keydeck
//!
//! This crate provides:
//! - [`Compositor`]: renders a [`KeyStyle`] into the device's native image
//!   format (tinted icon or glyph, wrapped label, rotation, encoding)
//! - [`GlyphMap`]: loads glyph key to character mappings from a stylesheet
//! - [`LabelFont`] / [`GlyphFont`]: built-in label fonts and the TrueType
//!   glyph font
//! - [`Driver`]: ties buttons, styles, power state and rendering to a device
//!
//! # Architecture
//!
//! ```text
//!  tick (1 s) ──┐                ┌──────────────┐
//!               ├──► Driver ───► │ PowerState   │
//!  key press  ──┘      │         └──────────────┘
//!                      ▼
//!               StyleResolver ──► RenderCache ──► Compositor
//!                      │
//!                      ▼
//!               KeyIndexMapper ──► DeckHandle::lock() ──► device
//! ```
//!
//! [`KeyStyle`]: keydeck_core::KeyStyle

#![deny(unsafe_code)]

pub mod canvas;
pub mod compositor;
pub mod driver;
pub mod fonts;
pub mod glyphs;

pub use compositor::{Compositor, GlyphSet, RenderError, LABEL_MARGIN};
pub use driver::{Driver, DriverError, DriverSettings};
pub use fonts::{GlyphFont, GlyphFontError, LabelFont, GLYPH_SIZE};
pub use glyphs::{GlyphMap, GlyphMapError};
