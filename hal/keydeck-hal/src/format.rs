//! Native key image format
//!
//! Each device model expects key images at a fixed size, in a fixed
//! encoding, and often mirrored or rotated relative to how the key is
//! physically seen. The compositor renders upright images and applies this
//! transform as its last step.

/// Wire encoding of a key image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageEncoding {
    /// Packed 8-bit RGB, row-major (used by simulators and tests)
    Raw,
    /// Windows bitmap
    Bmp,
    /// Baseline JPEG
    Jpeg,
}

/// Clockwise rotation applied before upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NativeRotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

/// Mirroring applied after rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mirror {
    #[default]
    None,
    /// Flip left/right
    X,
    /// Flip top/bottom
    Y,
    /// Flip both axes
    Both,
}

impl Mirror {
    /// Whether the image is flipped left/right
    pub fn flips_x(self) -> bool {
        matches!(self, Mirror::X | Mirror::Both)
    }

    /// Whether the image is flipped top/bottom
    pub fn flips_y(self) -> bool {
        matches!(self, Mirror::Y | Mirror::Both)
    }
}

/// Key image format for a device model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyImageFormat {
    /// Key width in pixels
    pub width: u32,
    /// Key height in pixels
    pub height: u32,
    /// Wire encoding
    pub encoding: ImageEncoding,
    /// Rotation applied before upload
    pub rotation: NativeRotation,
    /// Mirroring applied after rotation
    pub mirror: Mirror,
}

impl KeyImageFormat {
    /// Upright format with no native transform
    pub const fn upright(width: u32, height: u32, encoding: ImageEncoding) -> Self {
        Self {
            width,
            height,
            encoding,
            rotation: NativeRotation::None,
            mirror: Mirror::None,
        }
    }

    /// Whether the key canvas is square
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_axes() {
        assert!(!Mirror::None.flips_x());
        assert!(!Mirror::None.flips_y());
        assert!(Mirror::X.flips_x());
        assert!(!Mirror::X.flips_y());
        assert!(Mirror::Y.flips_y());
        assert!(Mirror::Both.flips_x() && Mirror::Both.flips_y());
    }

    #[test]
    fn test_upright_format() {
        let format = KeyImageFormat::upright(72, 72, ImageEncoding::Jpeg);
        assert!(format.is_square());
        assert_eq!(format.rotation, NativeRotation::None);
        assert_eq!(format.mirror, Mirror::None);

        let strip = KeyImageFormat::upright(200, 100, ImageEncoding::Raw);
        assert!(!strip.is_square());
    }
}
