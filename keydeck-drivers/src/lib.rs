//! Concrete collaborator implementations
//!
//! This crate provides implementations of the seams defined in
//! keydeck-core and keydeck-hal:
//!
//! - Home Assistant REST switch source ([`homeassistant`])
//! - USB HID Stream Deck device ([`hid`], feature `hid`)

#![deny(unsafe_code)]

pub mod homeassistant;

#[cfg(feature = "hid")]
pub mod hid;

pub use homeassistant::HomeAssistant;

#[cfg(feature = "hid")]
pub use hid::HidDeck;
