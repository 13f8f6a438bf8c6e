use crate::map_pipeline::common::error::Result;
use crate::map_pipeline::raster::types::RasterImage;

pub trait GrayscaleReader {
    fn read_gray(&self, data: &[u8]) -> Result<RasterImage>;
}
