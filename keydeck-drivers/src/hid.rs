//! USB HID Stream Deck device

use core::time::Duration;

use elgato_streamdeck::info::{ImageMirroring, ImageMode, ImageRotation, Kind};
use elgato_streamdeck::{list_devices, new_hidapi, StreamDeck, StreamDeckInput};
use keydeck_hal::{DeckDevice, DeviceError, ImageEncoding, KeyImageFormat, Mirror, NativeRotation};
use log::{debug, info};

fn transport(e: impl core::fmt::Debug) -> DeviceError {
    DeviceError::Transport(format!("{e:?}"))
}

/// Human readable model name
fn model_name(kind: Kind) -> String {
    match kind {
        Kind::Xl | Kind::XlV2 => "Stream Deck XL".to_string(),
        Kind::Original | Kind::OriginalV2 | Kind::Mk2 => "Stream Deck Original".to_string(),
        Kind::Mini | Kind::MiniMk2 => "Stream Deck Mini".to_string(),
        other => format!("Stream Deck {other:?}"),
    }
}

fn image_format(kind: Kind) -> Option<KeyImageFormat> {
    let native = kind.key_image_format();
    let encoding = match native.mode {
        ImageMode::None => return None,
        ImageMode::BMP => ImageEncoding::Bmp,
        ImageMode::JPEG => ImageEncoding::Jpeg,
    };
    let rotation = match native.rotation {
        ImageRotation::Rot0 => NativeRotation::None,
        ImageRotation::Rot90 => NativeRotation::Cw90,
        ImageRotation::Rot180 => NativeRotation::Cw180,
        ImageRotation::Rot270 => NativeRotation::Cw270,
    };
    let mirror = match native.mirror {
        ImageMirroring::None => Mirror::None,
        ImageMirroring::X => Mirror::X,
        ImageMirroring::Y => Mirror::Y,
        ImageMirroring::Both => Mirror::Both,
    };

    Some(KeyImageFormat {
        width: native.size.0 as u32,
        height: native.size.1 as u32,
        encoding,
        rotation,
        mirror,
    })
}

/// A Stream Deck with key screens
pub struct HidDeck {
    deck: Option<StreamDeck>,
    kind: Kind,
    format: KeyImageFormat,
    model: String,
    serial: String,
    firmware: String,
}

impl HidDeck {
    /// Open the first attached device that has key screens
    ///
    /// The device is reset on open.
    pub fn open_first() -> Result<Self, DeviceError> {
        let hid = new_hidapi().map_err(transport)?;
        let devices = list_devices(&hid);
        info!("Found {} Stream Deck(s)", devices.len());

        for (kind, serial) in devices {
            let Some(format) = image_format(kind) else {
                debug!("Skipping {:?} ({}): no key screens", kind, serial);
                continue;
            };

            let deck = StreamDeck::connect(&hid, kind, &serial).map_err(transport)?;
            deck.reset().map_err(transport)?;

            let serial = deck.serial_number().unwrap_or(serial);
            let firmware = deck.firmware_version().map_err(transport)?;
            let model = model_name(kind);
            info!(
                "Opened '{}' device (serial number: '{}', fw: '{}')",
                model, serial, firmware
            );

            return Ok(Self {
                deck: Some(deck),
                kind,
                format,
                model,
                serial,
                firmware,
            });
        }

        Err(DeviceError::NotFound)
    }

    fn deck(&self) -> Result<&StreamDeck, DeviceError> {
        self.deck.as_ref().ok_or(DeviceError::Closed)
    }
}

impl DeckDevice for HidDeck {
    fn model(&self) -> &str {
        &self.model
    }

    fn serial_number(&self) -> &str {
        &self.serial
    }

    fn firmware_version(&self) -> &str {
        &self.firmware
    }

    fn key_count(&self) -> usize {
        self.kind.key_count() as usize
    }

    fn key_layout(&self) -> (usize, usize) {
        (
            self.kind.row_count() as usize,
            self.kind.column_count() as usize,
        )
    }

    fn image_format(&self) -> KeyImageFormat {
        self.format
    }

    fn set_brightness(&mut self, percent: u8) -> Result<(), DeviceError> {
        self.deck()?.set_brightness(percent).map_err(transport)
    }

    fn set_key_image(&mut self, key: usize, image: &[u8]) -> Result<(), DeviceError> {
        if key >= self.key_count() {
            return Err(DeviceError::InvalidKey(key));
        }
        let deck = self.deck()?;
        deck.write_image(key as u8, image).map_err(transport)?;
        deck.flush().map_err(transport)
    }

    fn reset(&mut self) -> Result<(), DeviceError> {
        self.deck()?.reset().map_err(transport)
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        match self.deck.take() {
            Some(_) => {
                info!("Closed device {}", self.serial);
                Ok(())
            }
            None => Err(DeviceError::Closed),
        }
    }

    fn poll_keys(&mut self, timeout: Duration) -> Result<Option<Vec<bool>>, DeviceError> {
        match self.deck()?.read_input(Some(timeout)).map_err(transport)? {
            StreamDeckInput::ButtonStateChange(states) => Ok(Some(states)),
            _ => Ok(None),
        }
    }
}
