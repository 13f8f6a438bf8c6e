//! Grayscale reader backed by the `image` crate.
//!
//! Occupancy grid maps are usually stored as binary PGM (`P5`). Anything else
//! the enabled `image` features can decode is accepted too and converted to
//! 8-bit luma, so a PNG export of the same map works without extra steps.

use tracing::debug;

use crate::map_pipeline::common::error::{CropError, Result};
use crate::map_pipeline::raster::reader::GrayscaleReader;
use crate::map_pipeline::raster::types::RasterImage;

pub struct ImageCrateReader;

impl GrayscaleReader for ImageCrateReader {
    /// Decodes an encoded image and flattens it to one 8-bit channel.
    ///
    /// # Returns
    ///
    /// * `Ok(RasterImage)` - Decoded raster, row 0 at the top
    /// * `Err(CropError::ImageDecodeError)` - The bytes are not a supported image
    fn read_gray(&self, data: &[u8]) -> Result<RasterImage> {
        debug!("Decoding grayscale image, {} bytes", data.len());

        let decoded = image::load_from_memory(data)
            .map_err(|e| CropError::ImageDecodeError(e.to_string()))?;

        // Color inputs are reduced to luma; PGM input passes through unchanged
        let luma = decoded.to_luma8();
        let (width, height) = luma.dimensions();

        debug!("Decoded image: {}x{}", width, height);

        RasterImage::new(width as usize, height as usize, luma.into_raw())
    }
}
