//! embedded-graphics target over an in-memory RGB image

use core::convert::Infallible;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};
use image::{Rgb, RgbImage};

/// Draw target writing into an [`RgbImage`]; out of bounds pixels are dropped
pub struct ImageCanvas<'a> {
    image: &'a mut RgbImage,
}

impl<'a> ImageCanvas<'a> {
    pub fn new(image: &'a mut RgbImage) -> Self {
        Self { image }
    }
}

impl OriginDimensions for ImageCanvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}

impl DrawTarget for ImageCanvas<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.image.dimensions();

        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }

            let x = point.x as u32;
            let y = point.y as u32;
            if x < width && y < height {
                self.image
                    .put_pixel(x, y, Rgb([color.r(), color.g(), color.b()]));
            }
        }

        Ok(())
    }
}
