//! Device driver
//!
//! Owns the buttons, per-key state cache and screen power state for one
//! device. Entered from two places: the periodic refresh tick and key
//! events. Both must be serialized by the caller.

use core::fmt;
use std::time::Instant;

use keydeck_core::layout::LayoutError;
use keydeck_core::power::{has_brightness_quirk, PressOutcome, RefreshMode};
use keydeck_core::{
    Button, CacheKey, Fetch, IconTheme, KeyIndexMapper, PowerState, RenderCache, Rotation,
    StyleResolver,
};
use keydeck_hal::{DeckDevice, DeckHandle, DeviceError, KeyEvent};
use log::{debug, info, warn};

use crate::compositor::{Compositor, GlyphSet, RenderError};
use crate::fonts::LabelFont;

/// Fatal driver errors
#[derive(Debug)]
pub enum DriverError {
    /// Device could not be queried during setup
    Device(DeviceError),
    /// Key grid unusable
    Layout(LayoutError),
    /// A key image could not be rendered
    Render(RenderError),
    /// Key event from a device this driver does not own
    ForeignDevice { expected: String, got: String },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Device(e) => write!(f, "device error: {e}"),
            DriverError::Layout(e) => write!(f, "layout error: {e}"),
            DriverError::Render(e) => write!(f, "render error: {e}"),
            DriverError::ForeignDevice { expected, got } => {
                write!(f, "key event from device {got}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for DriverError {}

impl From<DeviceError> for DriverError {
    fn from(e: DeviceError) -> Self {
        DriverError::Device(e)
    }
}

impl From<LayoutError> for DriverError {
    fn from(e: LayoutError) -> Self {
        DriverError::Layout(e)
    }
}

impl From<RenderError> for DriverError {
    fn from(e: RenderError) -> Self {
        DriverError::Render(e)
    }
}

/// Driver configuration
#[derive(Debug)]
pub struct DriverSettings {
    /// Backlight brightness in percent
    pub brightness: u8,
    /// Idle seconds before blanking; zero or less disables blanking
    pub timeout_secs: i64,
    pub rotation: Rotation,
    pub theme: IconTheme,
    pub label_font: LabelFont,
    pub glyphs: Option<GlyphSet>,
}

/// Switch panel driver for one device
pub struct Driver<D: DeckDevice> {
    handle: DeckHandle<D>,
    device_id: String,
    key_count: usize,
    mapper: KeyIndexMapper,
    resolver: StyleResolver,
    compositor: Compositor,
    cache: RenderCache<CacheKey, Vec<u8>>,
    power: PowerState,
    buttons: Vec<Button>,
    brightness: u8,
    closed: bool,
}

impl<D: DeckDevice> Driver<D> {
    /// Set up the driver, apply the brightness and draw every key
    pub fn new(
        handle: DeckHandle<D>,
        settings: DriverSettings,
        now: Instant,
    ) -> Result<Self, DriverError> {
        let (device_id, model, firmware, key_count, (rows, cols), format) = {
            let device = handle.lock()?;
            (
                device.serial_number().to_string(),
                device.model().to_string(),
                device.firmware_version().to_string(),
                device.key_count(),
                device.key_layout(),
                device.image_format(),
            )
        };

        let quirky = has_brightness_quirk(&model, &firmware);
        if quirky {
            info!("{} firmware {} needs forced blanking", model, firmware);
        }

        let mapper = KeyIndexMapper::new(settings.rotation, rows, cols)?;
        let compositor = Compositor::new(
            format,
            settings.rotation,
            settings.label_font,
            settings.glyphs,
        );
        let resolver = StyleResolver::new(settings.theme, compositor.glyph_keys());

        let mut driver = Self {
            handle,
            device_id,
            key_count,
            mapper,
            resolver,
            compositor,
            cache: RenderCache::new(),
            power: PowerState::new(settings.timeout_secs, quirky, now),
            buttons: Vec::new(),
            brightness: settings.brightness,
            closed: false,
        };

        driver.send_brightness(driver.brightness);
        driver.refresh(now)?;
        Ok(driver)
    }

    /// Serial number of the driven device
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Configured buttons in logical order
    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// Append a button and redraw
    pub fn add_button(&mut self, button: Button, now: Instant) -> Result<(), DriverError> {
        self.buttons.push(button);
        self.refresh(now)
    }

    /// Append several buttons and redraw
    pub fn add_buttons(
        &mut self,
        buttons: impl IntoIterator<Item = Button>,
        now: Instant,
    ) -> Result<(), DriverError> {
        self.buttons.extend(buttons);
        self.refresh(now)
    }

    /// Configured brightness in percent
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Change and apply the brightness
    pub fn set_brightness(&mut self, percent: u8) {
        self.brightness = percent;
        self.send_brightness(percent);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Periodic tick: advance the power state and redraw every key
    pub fn refresh(&mut self, now: Instant) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }

        if self.power.on_refresh(now) == RefreshMode::Blanked {
            self.send_brightness(0);
        }

        for key in 0..self.key_count {
            self.update_key(key, Fetch::Live)?;
        }
        Ok(())
    }

    /// Handle a key transition reported by the device
    ///
    /// Releases are ignored. A press on a blanked screen only wakes it.
    pub fn on_key(&mut self, event: &KeyEvent, now: Instant) -> Result<(), DriverError> {
        if event.device != self.device_id {
            return Err(DriverError::ForeignDevice {
                expected: self.device_id.clone(),
                got: event.device.clone(),
            });
        }
        if !event.pressed || self.closed {
            return Ok(());
        }
        if event.key >= self.key_count {
            warn!("Ignoring press on unknown key {}", event.key);
            return Ok(());
        }

        let key = self.mapper.physical_to_virtual(event.key);
        debug!("Key {} (physical {}) pressed", key, event.key);

        match self.power.on_press(now) {
            PressOutcome::Wake { redraw_cached } => {
                self.send_brightness(self.brightness);
                if redraw_cached {
                    for key in 0..self.key_count {
                        self.update_key(key, Fetch::CachedOnly)?;
                    }
                }
                Ok(())
            }
            PressOutcome::Interact => {
                if let Some(button) = self.buttons.get_mut(key) {
                    let state = button.state();
                    button.set_state(!state.unwrap_or(false));
                }
                self.update_key(key, Fetch::Live)
            }
        }
    }

    /// Clear all keys and release the device
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let result = self.handle.with(|device| {
            device.reset()?;
            device.close()
        });
        match result {
            Ok(()) => info!("Device {} closed", self.device_id),
            Err(e) => warn!("Failed to close device {}: {}", self.device_id, e),
        }
    }

    fn send_brightness(&self, percent: u8) {
        if let Err(e) = self.handle.with(|device| device.set_brightness(percent)) {
            warn!("Failed to set brightness {}: {}", percent, e);
        }
    }

    fn update_key(&mut self, key: usize, fetch: Fetch) -> Result<(), DriverError> {
        let style = self
            .resolver
            .resolve(key, self.buttons.get_mut(key), &mut self.power, fetch);
        let cache_key = CacheKey {
            style: style.clone(),
            rotation: self.mapper.rotation(),
        };

        let compositor = &self.compositor;
        let image = self
            .cache
            .get_or_render(cache_key, || compositor.render(&style))?;

        let physical = self.mapper.virtual_to_physical(key);
        if let Err(e) = self
            .handle
            .with(|device| device.set_key_image(physical, &image))
        {
            warn!("Failed to write key {}: {}", physical, e);
        }
        Ok(())
    }
}

impl<D: DeckDevice> fmt::Debug for Driver<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("device_id", &self.device_id)
            .field("key_count", &self.key_count)
            .field("buttons", &self.buttons.len())
            .field("brightness", &self.brightness)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
