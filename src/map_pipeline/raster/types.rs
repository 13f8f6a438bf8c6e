//! Grayscale raster types

use crate::map_pipeline::common::error::{CropError, Result};

/// Single channel 8-bit raster, row-major, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Pixel intensities, `width * height` bytes
    pub data: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(CropError::InvalidDimensions(width, height));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a raster by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> u8) -> Result<Self> {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::new(width, height, data)
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Copies the `width x height` block whose top-left pixel is `(left, top)`.
    pub fn sub_image(&self, left: usize, top: usize, width: usize, height: usize) -> Result<Self> {
        if left + width > self.width || top + height > self.height {
            return Err(CropError::InvalidDimensions(width, height));
        }
        let mut data = Vec::with_capacity(width * height);
        for y in top..top + height {
            data.extend_from_slice(&self.row(y)[left..left + width]);
        }
        Self::new(width, height, data)
    }
}

/// The two rasters a run works on.
#[derive(Debug, Clone)]
pub struct RasterPair {
    pub original: RasterImage,
    pub crop: RasterImage,
}

impl RasterPair {
    pub fn new(original: RasterImage, crop: RasterImage) -> Self {
        Self { original, crop }
    }
}
