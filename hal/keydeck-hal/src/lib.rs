//! Keydeck Hardware Abstraction Layer
//!
//! This crate defines the device-handle interface the driver talks to. A
//! concrete transport (USB HID, or a mock in tests) implements
//! [`DeckDevice`]; the driver only ever reaches it through a [`DeckHandle`],
//! which serializes every call so image writes from the render path never
//! interleave with key reads from the input thread.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Driver (keydeck-display)               │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  keydeck-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ keydeck-      │       │  test mocks   │
//! │ drivers::hid  │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`device::DeckDevice`] - Key images, brightness, key polling
//! - [`handle::DeckHandle`] - Scoped, shared access to a device
//! - [`input::KeyTracker`] - Press/release edge detection

#![deny(unsafe_code)]

pub mod device;
pub mod format;
pub mod handle;
pub mod input;

// Re-export key types at crate root for convenience
pub use device::{DeckDevice, DeviceError};
pub use format::{ImageEncoding, KeyImageFormat, Mirror, NativeRotation};
pub use handle::DeckHandle;
pub use input::{KeyEvent, KeyTracker};
