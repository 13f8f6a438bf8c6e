use crate::map_pipeline::raster::RasterImage;

/// Summed-area table of squared intensities.
///
/// Stored with one leading row and column of zeros, so any window sum is four
/// lookups with no bounds special-casing.
pub(crate) struct SquaredIntegral {
    stride: usize,
    table: Vec<u64>,
}

impl SquaredIntegral {
    pub(crate) fn new(image: &RasterImage) -> Self {
        let stride = image.width + 1;
        let mut table = vec![0u64; stride * (image.height + 1)];

        for y in 0..image.height {
            let mut row_sum = 0u64;
            for (x, &value) in image.row(y).iter().enumerate() {
                let value = value as u64;
                row_sum += value * value;
                table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
            }
        }

        Self { stride, table }
    }

    /// Sum of squared intensities over the `width x height` window at `(x, y)`.
    pub(crate) fn window_sum(&self, x: usize, y: usize, width: usize, height: usize) -> u64 {
        let s = self.stride;
        let (x1, y1) = (x + width, y + height);
        self.table[y1 * s + x1] + self.table[y * s + x] - self.table[y * s + x1] - self.table[y1 * s + x]
    }
}
