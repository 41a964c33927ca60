//! Key image compositor
//!
//! Renders a [`KeyStyle`] into bytes the device accepts:
//!
//! ```text
//! ┌──────────────┐
//! │              │  icon: image file scaled into the area above the
//! │     icon     │        label margin, multiplied by the tint color;
//! │              │        or a 64 px font glyph drawn in the tint color
//! ├──────────────┤
//! │    label     │  label: white, wrapped, bottom anchored
//! └──────────────┘
//!        │
//!        ▼  whole-screen rotation (counter-clockwise, square keys only)
//!        ▼  native rotation + mirror
//!        ▼  encode (raw / BMP / JPEG)
//! ```
//!
//! Rendering is deterministic: the same style always yields the same bytes.

use core::fmt;
use std::path::{Path, PathBuf};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, Rgb, RgbImage, Rgba, RgbaImage};
use keydeck_core::text::wrap_text;
use keydeck_core::{ColorSpec, IconRef, KeyStyle, Rotation};
use keydeck_hal::{ImageEncoding, KeyImageFormat, NativeRotation};
use log::{debug, warn};

use crate::canvas::ImageCanvas;
use crate::fonts::{GlyphFont, LabelFont};
use crate::glyphs::GlyphMap;

/// Pixels reserved below the icon when a label is drawn
pub const LABEL_MARGIN: u32 = 20;

/// Gap between the last label line slot and the bottom edge
const LABEL_BOTTOM_PADDING: u32 = 5;

/// Minimum number of label line slots
const MIN_LABEL_LINES: u32 = 2;

/// JPEG quality for devices that take JPEG key images
const JPEG_QUALITY: u8 = 90;

/// Rendering errors
#[derive(Debug)]
pub enum RenderError {
    /// Icon file missing or undecodable
    Icon { path: PathBuf, source: ImageError },
    /// Glyph key not present in the glyph map
    UnknownGlyph(String),
    /// Glyph icon requested without a glyph font
    NoGlyphFont,
    /// Glyph font has no outline for the glyph key
    Glyph(String),
    /// Whole-screen rotation needs square keys
    NonSquareCanvas { width: u32, height: u32 },
    /// Native encoding failed
    Encode(ImageError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Icon { path, source } => {
                write!(f, "cannot load icon {}: {}", path.display(), source)
            }
            RenderError::UnknownGlyph(key) => write!(f, "unknown glyph {key}"),
            RenderError::NoGlyphFont => write!(f, "glyph icon without a glyph font"),
            RenderError::Glyph(key) => write!(f, "glyph font cannot draw {key}"),
            RenderError::NonSquareCanvas { width, height } => {
                write!(f, "cannot rotate non-square key image {width}x{height}")
            }
            RenderError::Encode(e) => write!(f, "cannot encode key image: {e}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Icon { source, .. } => Some(source),
            RenderError::Encode(e) => Some(e),
            _ => None,
        }
    }
}

/// Glyph font and the mapping into it
#[derive(Debug)]
pub struct GlyphSet {
    pub font: GlyphFont,
    pub map: GlyphMap,
}

/// Renders key styles for one device
#[derive(Debug)]
pub struct Compositor {
    format: KeyImageFormat,
    rotation: Rotation,
    label_font: LabelFont,
    glyphs: Option<GlyphSet>,
}

impl Compositor {
    pub fn new(
        format: KeyImageFormat,
        rotation: Rotation,
        label_font: LabelFont,
        glyphs: Option<GlyphSet>,
    ) -> Self {
        Self {
            format,
            rotation,
            label_font,
            glyphs,
        }
    }

    /// Glyph keys this compositor can draw
    ///
    /// Mapped keys whose glyphs are missing from the font are left out, so
    /// those keys keep their state images.
    pub fn glyph_keys(&self) -> Vec<String> {
        let Some(set) = &self.glyphs else {
            return Vec::new();
        };

        let mut missing = 0;
        let keys: Vec<String> = set
            .map
            .iter()
            .filter_map(|(key, text)| {
                if set.font.can_draw(text) {
                    Some(key.to_string())
                } else {
                    debug!("Glyph {} not in {}", key, set.font.name());
                    missing += 1;
                    None
                }
            })
            .collect();

        if missing > 0 {
            warn!(
                "{} of {} mapped glyphs missing from {}, using state images for them",
                missing,
                set.map.len(),
                set.font.name()
            );
        }
        keys
    }

    /// Render `style` to native device bytes
    pub fn render(&self, style: &KeyStyle) -> Result<Vec<u8>, RenderError> {
        let image = self.compose(style)?;
        let image = rotate_canvas(image, self.rotation)?;
        encode(image, &self.format)
    }

    /// Render `style` to an upright, unencoded image
    pub fn compose(&self, style: &KeyStyle) -> Result<RgbImage, RenderError> {
        let mut image = match &style.icon {
            IconRef::Image(path) => self.draw_image_icon(path, style)?,
            IconRef::Glyph(key) => self.draw_glyph_icon(key, style)?,
        };

        if let Some(label) = &style.label {
            self.draw_label(&mut image, label);
        }

        Ok(image)
    }

    fn draw_image_icon(&self, path: &Path, style: &KeyStyle) -> Result<RgbImage, RenderError> {
        let (width, height) = (self.format.width, self.format.height);
        let margin = if style.label.is_some() { LABEL_MARGIN } else { 0 };
        let area_height = height.saturating_sub(margin);

        let icon = image::open(path).map_err(|source| RenderError::Icon {
            path: path.to_path_buf(),
            source,
        })?;

        // Only ever shrink, keeping the aspect ratio
        let icon = if icon.width() > width || icon.height() > area_height {
            icon.resize(width, area_height.max(1), FilterType::Lanczos3)
        } else {
            icon
        };
        let icon = icon.to_rgba8();

        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0xFF]));
        let x = (width - icon.width().min(width)) / 2;
        let y = (area_height - icon.height().min(area_height)) / 2;
        imageops::overlay(&mut canvas, &icon, i64::from(x), i64::from(y));

        let mut image = DynamicImage::ImageRgba8(canvas).to_rgb8();
        tint(&mut image, style.color);
        Ok(image)
    }

    fn draw_glyph_icon(&self, key: &str, style: &KeyStyle) -> Result<RgbImage, RenderError> {
        let glyphs = self.glyphs.as_ref().ok_or(RenderError::NoGlyphFont)?;
        let text = glyphs
            .map
            .get(key)
            .ok_or_else(|| RenderError::UnknownGlyph(key.to_string()))?;

        let mask = glyphs
            .font
            .rasterize(text)
            .ok_or_else(|| RenderError::Glyph(key.to_string()))?;

        let (width, height) = (self.format.width, self.format.height);
        let mut image = RgbImage::new(width, height);

        // Centered, or top aligned above a label
        let x = (i64::from(width) - i64::from(mask.width())) / 2;
        let y = if style.label.is_some() {
            0
        } else {
            (i64::from(height) - i64::from(mask.height())) / 2
        };

        let color = [style.color.r, style.color.g, style.color.b];
        for (mx, my, coverage) in mask.enumerate_pixels() {
            let (px, py) = (x + i64::from(mx), y + i64::from(my));
            if px < 0 || py < 0 || px >= i64::from(width) || py >= i64::from(height) {
                continue;
            }
            let level = u16::from(coverage.0[0]);
            let pixel = color.map(|channel| ((u16::from(channel) * level) / 0xFF) as u8);
            image.put_pixel(px as u32, py as u32, Rgb(pixel));
        }

        Ok(image)
    }

    fn draw_label(&self, image: &mut RgbImage, label: &str) {
        let width = image.width();
        let height = image.height() as i32;
        let lines = wrap_text(&self.label_font, label, width);
        let slots = (lines.len() as u32).max(MIN_LABEL_LINES);
        let line_height = self.label_font.line_height();
        let style = self.label_font.style(Rgb888::WHITE);

        let mut canvas = ImageCanvas::new(image);
        for (index, line) in lines.iter().enumerate() {
            let x = (width as i32 - line.width as i32) / 2;
            let offset = LABEL_BOTTOM_PADDING + line_height * (slots - index as u32);
            let y = height - offset as i32;

            // Infallible target
            let _ = Text::with_baseline(&line.text, Point::new(x, y), style, Baseline::Top)
                .draw(&mut canvas);
        }
    }
}

/// Multiply every pixel by `color`
fn tint(image: &mut RgbImage, color: ColorSpec) {
    let factor = [color.r, color.g, color.b];
    for pixel in image.pixels_mut() {
        for (channel, factor) in pixel.0.iter_mut().zip(factor) {
            *channel = ((u16::from(*channel) * u16::from(factor)) / 0xFF) as u8;
        }
    }
}

/// Rotate the finished key counter-clockwise by the whole-screen rotation
pub fn rotate_canvas(image: RgbImage, rotation: Rotation) -> Result<RgbImage, RenderError> {
    if rotation == Rotation::Deg0 {
        return Ok(image);
    }

    let (width, height) = image.dimensions();
    if width != height {
        return Err(RenderError::NonSquareCanvas { width, height });
    }

    Ok(match rotation {
        Rotation::Deg0 => image,
        Rotation::Deg90 => imageops::rotate270(&image),
        Rotation::Deg180 => imageops::rotate180(&image),
        Rotation::Deg270 => imageops::rotate90(&image),
    })
}

/// Apply the device's native transform and encode
pub fn encode(image: RgbImage, format: &KeyImageFormat) -> Result<Vec<u8>, RenderError> {
    let mut image = match format.rotation {
        NativeRotation::None => image,
        NativeRotation::Cw90 => imageops::rotate90(&image),
        NativeRotation::Cw180 => imageops::rotate180(&image),
        NativeRotation::Cw270 => imageops::rotate270(&image),
    };
    if format.mirror.flips_x() {
        imageops::flip_horizontal_in_place(&mut image);
    }
    if format.mirror.flips_y() {
        imageops::flip_vertical_in_place(&mut image);
    }

    let mut bytes = Vec::new();
    match format.encoding {
        ImageEncoding::Raw => return Ok(image.into_raw()),
        ImageEncoding::Bmp => image
            .write_with_encoder(BmpEncoder::new(&mut bytes))
            .map_err(RenderError::Encode)?,
        ImageEncoding::Jpeg => image
            .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY))
            .map_err(RenderError::Encode)?,
    }
    Ok(bytes)
}
