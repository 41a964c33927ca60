//! Configuration loading
//!
//! Reads the TOML file, falling back to the embedded defaults, and turns
//! it into driver settings and buttons.

pub mod loader;

pub use loader::{build_buttons, driver_settings, load_config, parse_config};
