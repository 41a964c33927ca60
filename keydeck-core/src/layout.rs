//! Virtual/physical key index mapping
//!
//! Buttons are configured in logical order as if the device were mounted
//! upright. When the whole device is mounted rotated, the firmware still
//! addresses keys in its own row-major raster order, so every key write and
//! every key event passes through a [`KeyIndexMapper`].

use core::fmt;

/// Layout errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// Rotation is not a right angle
    InvalidRotation(i32),
    /// Key grid has no rows or no columns
    EmptyGrid,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::InvalidRotation(deg) => {
                write!(f, "invalid rotation value {deg}, must be a right angle")
            }
            LayoutError::EmptyGrid => write!(f, "key grid has no rows or columns"),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Whole-screen rotation, counter-clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Parse a rotation in degrees
    ///
    /// Accepts 0, 90, 180, 270 and their negative counterparts, which are
    /// normalized by adding 360.
    pub fn from_degrees(degrees: i32) -> Result<Self, LayoutError> {
        if !(-270..=270).contains(&degrees) {
            return Err(LayoutError::InvalidRotation(degrees));
        }
        let normalized = if degrees < 0 { degrees + 360 } else { degrees };
        match normalized {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            _ => Err(LayoutError::InvalidRotation(degrees)),
        }
    }

    /// Rotation in degrees (0-270)
    pub const fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// All supported rotations
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];
}

/// Bijective virtual <-> physical key index transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyIndexMapper {
    rotation: Rotation,
    rows: usize,
    cols: usize,
}

impl KeyIndexMapper {
    /// Create a mapper for a `rows` x `cols` device
    pub fn new(rotation: Rotation, rows: usize, cols: usize) -> Result<Self, LayoutError> {
        if rows == 0 || cols == 0 {
            return Err(LayoutError::EmptyGrid);
        }
        Ok(Self {
            rotation,
            rows,
            cols,
        })
    }

    /// Configured rotation
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Number of addressable keys
    pub fn key_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Map a logical key index to the index the firmware expects
    pub fn virtual_to_physical(&self, key: usize) -> usize {
        let (rows, cols) = (self.rows, self.cols);
        match self.rotation {
            Rotation::Deg0 => key,
            Rotation::Deg90 => {
                let row = (rows - 1) - (key % rows);
                let col = key / rows;
                cols * row + col
            }
            Rotation::Deg180 => (rows * cols - 1) - key,
            Rotation::Deg270 => {
                let row = key % rows;
                let col = (cols - 1) - key / rows;
                cols * row + col
            }
        }
    }

    /// Map a firmware key index back to the logical key index
    pub fn physical_to_virtual(&self, key: usize) -> usize {
        let (rows, cols) = (self.rows, self.cols);
        match self.rotation {
            Rotation::Deg0 => key,
            Rotation::Deg90 => {
                let row = key / cols;
                let col = key % cols;
                ((rows - 1) - row) + rows * col
            }
            Rotation::Deg180 => (rows * cols - 1) - key,
            Rotation::Deg270 => {
                let row = key / cols;
                let col = key % cols;
                row + ((cols - 1) - col) * rows
            }
        }
    }
}
