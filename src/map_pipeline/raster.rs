//! Grayscale raster module
//!
//! In-memory map rasters and the decoders that produce them.

mod image_reader;
mod reader;
pub mod types;

pub use image_reader::ImageCrateReader;
pub use reader::GrayscaleReader;
pub use types::{RasterImage, RasterPair};
