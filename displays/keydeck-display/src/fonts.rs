//! Label and glyph fonts
//!
//! Labels use the ISO 8859-1 monospace fonts bundled with embedded-graphics.
//! Glyph icons come from a TrueType font file, rasterized at [`GLYPH_SIZE`].

use core::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, Rect, ScaleFont};

use embedded_graphics::mono_font::{iso_8859_1 as mono, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::Baseline;
use keydeck_core::config::FontFace;
use image::GrayImage;
use keydeck_core::text::FontMetrics;

const REGULAR: &[&MonoFont<'static>] = &[
    &mono::FONT_4X6,
    &mono::FONT_5X7,
    &mono::FONT_5X8,
    &mono::FONT_6X9,
    &mono::FONT_6X10,
    &mono::FONT_6X12,
    &mono::FONT_6X13,
    &mono::FONT_7X13,
    &mono::FONT_7X14,
    &mono::FONT_8X13,
    &mono::FONT_9X15,
    &mono::FONT_9X18,
    &mono::FONT_10X20,
];

const BOLD: &[&MonoFont<'static>] = &[
    &mono::FONT_6X13_BOLD,
    &mono::FONT_7X13_BOLD,
    &mono::FONT_7X14_BOLD,
    &mono::FONT_8X13_BOLD,
    &mono::FONT_9X15_BOLD,
    &mono::FONT_9X18_BOLD,
];

/// Monospace label font
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LabelFont {
    face: FontFace,
    index: usize,
}

impl LabelFont {
    /// Pick the tallest font of `face` not taller than `size` pixels,
    /// or the smallest one when none fits
    pub fn select(face: FontFace, size: u32) -> Self {
        let height = |&(_, font): &(usize, &&MonoFont<'static>)| font.character_size.height;
        let family = Self::family(face);

        let index = family
            .iter()
            .enumerate()
            .filter(|(_, font)| font.character_size.height <= size)
            .max_by_key(height)
            .or_else(|| family.iter().enumerate().min_by_key(height))
            .map_or(0, |(index, _)| index);

        Self { face, index }
    }

    fn family(face: FontFace) -> &'static [&'static MonoFont<'static>] {
        match face {
            FontFace::Regular => REGULAR,
            FontFace::Bold => BOLD,
        }
    }

    fn font(&self) -> &'static MonoFont<'static> {
        Self::family(self.face)[self.index]
    }

    /// Line height in pixels
    pub fn line_height(&self) -> u32 {
        self.font().character_size.height
    }

    /// Text style drawing in `color`
    pub fn style(&self, color: Rgb888) -> MonoTextStyle<'static, Rgb888> {
        MonoTextStyle::new(self.font(), color)
    }
}

impl FontMetrics for LabelFont {
    fn text_width(&self, text: &str) -> u32 {
        self.style(Rgb888::new(0xFF, 0xFF, 0xFF))
            .measure_string(text, Point::zero(), Baseline::Top)
            .bounding_box
            .size
            .width
    }

    fn text_height(&self, _text: &str) -> u32 {
        self.line_height()
    }
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.font().character_size;
        write!(f, "LabelFont({}x{})", size.width, size.height)
    }
}

/// Pixel height glyph icons are drawn at
pub const GLYPH_SIZE: f32 = 64.0;

/// Glyph font load errors
#[derive(Debug)]
pub enum GlyphFontError {
    /// Font file could not be read
    Io { path: PathBuf, source: io::Error },
    /// Not a TrueType or OpenType font
    Invalid { path: PathBuf },
}

impl fmt::Display for GlyphFontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphFontError::Io { path, source } => {
                write!(f, "cannot read glyph font {}: {}", path.display(), source)
            }
            GlyphFontError::Invalid { path } => {
                write!(f, "{} is not a usable font", path.display())
            }
        }
    }
}

impl std::error::Error for GlyphFontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GlyphFontError::Io { source, .. } => Some(source),
            GlyphFontError::Invalid { .. } => None,
        }
    }
}

/// TrueType icon font
pub struct GlyphFont {
    name: String,
    font: FontVec,
}

impl GlyphFont {
    /// Load the font file at `path`
    pub fn load(path: &Path) -> Result<Self, GlyphFontError> {
        let data = fs::read(path).map_err(|source| GlyphFontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self::from_vec(name, data).ok_or_else(|| GlyphFontError::Invalid {
            path: path.to_path_buf(),
        })
    }

    /// Parse in-memory font data
    pub fn from_vec(name: impl Into<String>, data: Vec<u8>) -> Option<Self> {
        let font = FontVec::try_from_vec(data).ok()?;
        Some(Self {
            name: name.into(),
            font,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether every character of `text` has an outline in this font
    pub fn can_draw(&self, text: &str) -> bool {
        !text.is_empty()
            && text.chars().all(|c| {
                let id = self.font.glyph_id(c);
                id != GlyphId(0) && self.font.outline(id).is_some()
            })
    }

    /// Coverage mask of `text` at [`GLYPH_SIZE`], cropped to the inked area
    ///
    /// `None` when any character is missing from the font.
    pub fn rasterize(&self, text: &str) -> Option<GrayImage> {
        if !self.can_draw(text) {
            return None;
        }

        let scaled = self.font.as_scaled(PxScale::from(GLYPH_SIZE));
        let mut caret = 0.0;
        let mut outlines = Vec::new();
        for c in text.chars() {
            let id = self.font.glyph_id(c);
            let glyph = id.with_scale_and_position(GLYPH_SIZE, point(caret, scaled.ascent()));
            caret += scaled.h_advance(id);
            outlines.push(self.font.outline_glyph(glyph)?);
        }

        let bounds = outlines
            .iter()
            .map(|outline| outline.px_bounds())
            .reduce(|a, b| Rect {
                min: point(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
                max: point(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
            })?;
        let width = bounds.width().ceil() as u32;
        let height = bounds.height().ceil() as u32;
        if width == 0 || height == 0 {
            return None;
        }

        let mut mask = GrayImage::new(width, height);
        for outline in &outlines {
            let origin = outline.px_bounds().min;
            let dx = (origin.x - bounds.min.x) as u32;
            let dy = (origin.y - bounds.min.y) as u32;
            outline.draw(|x, y, coverage| {
                let (x, y) = (x + dx, y + dy);
                if x < width && y < height {
                    let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                    let pixel = mask.get_pixel_mut(x, y);
                    pixel.0[0] = pixel.0[0].max(value);
                }
            });
        }
        Some(mask)
    }
}

impl fmt::Debug for GlyphFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlyphFont({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_largest_fitting() {
        assert_eq!(LabelFont::select(FontFace::Regular, 14).line_height(), 14);
        assert_eq!(LabelFont::select(FontFace::Regular, 11).line_height(), 10);
        assert_eq!(LabelFont::select(FontFace::Regular, 100).line_height(), 20);
        assert_eq!(LabelFont::select(FontFace::Bold, 16).line_height(), 15);
    }

    #[test]
    fn test_select_falls_back_to_smallest() {
        assert_eq!(LabelFont::select(FontFace::Regular, 2).line_height(), 6);
        assert_eq!(LabelFont::select(FontFace::Bold, 8).line_height(), 13);
    }

    #[test]
    fn test_monospace_metrics() {
        let font = LabelFont::select(FontFace::Regular, 10);
        assert_eq!(font.text_width(""), 0);
        assert_eq!(font.text_width("abcd"), 4 * font.text_width("a"));
        assert_eq!(font.text_height("anything"), 10);
    }

    #[test]
    fn test_glyph_font_from_file() {
        let dir = std::env::temp_dir().join(format!("keydeck-fonts-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("icons.ttf");
        fs::write(&path, test_font::square_font(&['\u{F0335}'])).unwrap();

        let font = GlyphFont::load(&path).unwrap();
        assert_eq!(font.name(), "icons.ttf");
        assert!(font.can_draw("\u{F0335}"));
        assert!(!font.can_draw("\u{F02DC}"));
        assert!(!font.can_draw(""));
    }

    #[test]
    fn test_glyph_font_errors() {
        assert!(matches!(
            GlyphFont::load(Path::new("/nonexistent/icons.ttf")),
            Err(GlyphFontError::Io { .. })
        ));

        let dir = std::env::temp_dir().join(format!("keydeck-fonts-bad-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("icons.ttf");
        fs::write(&path, b"not a font").unwrap();
        assert!(matches!(
            GlyphFont::load(&path),
            Err(GlyphFontError::Invalid { .. })
        ));
    }

    #[test]
    fn test_rasterize_private_use_glyph() {
        let font = GlyphFont::from_vec("icons", test_font::square_font(&['\u{F0335}'])).unwrap();

        let mask = font.rasterize("\u{F0335}").unwrap();
        assert_eq!(mask.dimensions(), (64, 64));
        assert_eq!(mask.get_pixel(32, 32).0[0], 0xFF);

        assert!(font.rasterize("\u{F0336}").is_none());
    }
}

/// Minimal TrueType fonts for tests
#[cfg(test)]
pub(crate) mod test_font {
    fn u16be(out: &mut Vec<u8>, value: u16) {
        out.extend_from_slice(&value.to_be_bytes());
    }

    fn u32be(out: &mut Vec<u8>, value: u32) {
        out.extend_from_slice(&value.to_be_bytes());
    }

    /// Font with 1000 units per em where every char in `chars` maps to one
    /// full-em square glyph
    pub(crate) fn square_font(chars: &[char]) -> Vec<u8> {
        let mut chars = chars.to_vec();
        chars.sort_unstable();
        chars.dedup();

        // Format 12 subtable, Windows full Unicode
        let mut cmap = Vec::new();
        u16be(&mut cmap, 0);
        u16be(&mut cmap, 1);
        u16be(&mut cmap, 3);
        u16be(&mut cmap, 10);
        u32be(&mut cmap, 12);
        u16be(&mut cmap, 12);
        u16be(&mut cmap, 0);
        u32be(&mut cmap, 16 + 12 * chars.len() as u32);
        u32be(&mut cmap, 0);
        u32be(&mut cmap, chars.len() as u32);
        for &c in &chars {
            u32be(&mut cmap, c as u32);
            u32be(&mut cmap, c as u32);
            u32be(&mut cmap, 1);
        }

        // Glyph 0 is an empty .notdef, glyph 1 the square
        let mut glyf = Vec::new();
        for value in [1i16, 0, 0, 1000, 1000] {
            u16be(&mut glyf, value as u16);
        }
        u16be(&mut glyf, 3);
        u16be(&mut glyf, 0);
        glyf.extend_from_slice(&[0x01; 4]);
        for delta in [0i16, 1000, 0, -1000, 0, 0, 1000, 0] {
            u16be(&mut glyf, delta as u16);
        }

        let mut head = Vec::new();
        u32be(&mut head, 0x0001_0000);
        u32be(&mut head, 0x0001_0000);
        u32be(&mut head, 0);
        u32be(&mut head, 0x5F0F_3CF5);
        u16be(&mut head, 0);
        u16be(&mut head, 1000);
        head.extend_from_slice(&[0; 16]);
        for value in [0u16, 0, 1000, 1000, 0, 8, 2, 0, 0] {
            u16be(&mut head, value);
        }

        let mut hhea = Vec::new();
        u32be(&mut hhea, 0x0001_0000);
        for value in [1000u16, 0, 0, 1000, 0, 0, 1000, 1, 0, 0, 0, 0, 0, 0, 0, 2] {
            u16be(&mut hhea, value);
        }

        let mut hmtx = Vec::new();
        for value in [1000u16, 0, 1000, 0] {
            u16be(&mut hmtx, value);
        }

        let mut loca = Vec::new();
        for value in [0u16, 0, (glyf.len() / 2) as u16] {
            u16be(&mut loca, value);
        }

        let mut maxp = Vec::new();
        u32be(&mut maxp, 0x0000_5000);
        u16be(&mut maxp, 2);

        let tables: [(&[u8; 4], Vec<u8>); 7] = [
            (b"cmap", cmap),
            (b"glyf", glyf),
            (b"head", head),
            (b"hhea", hhea),
            (b"hmtx", hmtx),
            (b"loca", loca),
            (b"maxp", maxp),
        ];

        let mut font = Vec::new();
        u32be(&mut font, 0x0001_0000);
        u16be(&mut font, tables.len() as u16);
        u16be(&mut font, 64);
        u16be(&mut font, 2);
        u16be(&mut font, 48);

        let mut offset = 12 + 16 * tables.len();
        let mut body = Vec::new();
        for (tag, data) in &tables {
            font.extend_from_slice(*tag);
            u32be(&mut font, 0);
            u32be(&mut font, offset as u32);
            u32be(&mut font, data.len() as u32);

            body.extend_from_slice(data);
            let padded = (data.len() + 3) & !3;
            body.resize(body.len() + padded - data.len(), 0);
            offset += padded;
        }
        font.extend_from_slice(&body);
        font
    }
}
