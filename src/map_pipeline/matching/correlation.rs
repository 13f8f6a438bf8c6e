//! Cross terms of the sliding-window SSD.
//!
//! For every valid window position `(x, y)` this computes
//! `Σ crop(tx, ty) · original(x + tx, y + ty)` as an exact integer. Large
//! searches go through a 2D FFT cross-correlation; the products of 8-bit
//! intensities are integers, so rounding the f64 result recovers the exact
//! sum. Small searches use the direct loop, which is faster below the FFT
//! setup cost.

use std::sync::Arc;

use rayon::prelude::*;
use rustfft::{Fft, FftPlanner, num_complex::Complex};
use tracing::debug;

use crate::map_pipeline::raster::RasterImage;

/// Total multiply-adds (positions x crop area) below which the direct loop wins.
pub(crate) const DIRECT_WORK_LIMIT: usize = 1 << 22;

/// Number of window positions along each axis. Caller guarantees the crop fits.
pub(crate) fn search_extent(original: &RasterImage, crop: &RasterImage) -> (usize, usize) {
    (
        original.width - crop.width + 1,
        original.height - crop.height + 1,
    )
}

/// Cross terms for all positions, row-major over the search extent.
pub(crate) fn cross_correlate(original: &RasterImage, crop: &RasterImage, parallel: bool) -> Vec<u64> {
    let (nx, ny) = search_extent(original, crop);
    let work = (nx * ny).saturating_mul(crop.width * crop.height);

    if work <= DIRECT_WORK_LIMIT {
        debug!(work, "Using direct correlation");
        correlate_direct(original, crop, parallel)
    } else {
        debug!(work, "Using FFT correlation");
        correlate_fft(original, crop, parallel)
    }
}

pub(crate) fn correlate_direct(original: &RasterImage, crop: &RasterImage, parallel: bool) -> Vec<u64> {
    let (nx, ny) = search_extent(original, crop);

    let row = |y: usize| -> Vec<u64> {
        (0..nx)
            .map(|x| {
                (0..crop.height)
                    .map(|ty| {
                        original.row(y + ty)[x..x + crop.width]
                            .iter()
                            .zip(crop.row(ty))
                            .map(|(&a, &b)| a as u64 * b as u64)
                            .sum::<u64>()
                    })
                    .sum::<u64>()
            })
            .collect()
    };

    if parallel {
        (0..ny).into_par_iter().flat_map_iter(row).collect()
    } else {
        (0..ny).flat_map(row).collect()
    }
}

pub(crate) fn correlate_fft(original: &RasterImage, crop: &RasterImage, parallel: bool) -> Vec<u64> {
    let (nx, ny) = search_extent(original, crop);

    // Cyclic correlation never wraps for valid positions as long as the
    // padded grid covers the original.
    let pw = fast_len(original.width);
    let ph = fast_len(original.height);
    debug!(pw, ph, "FFT grid");

    let mut planner = FftPlanner::<f64>::new();
    let forward = (planner.plan_fft_forward(pw), planner.plan_fft_forward(ph));
    let inverse = (planner.plan_fft_inverse(pw), planner.plan_fft_inverse(ph));

    let mut image_freq = embed(original, pw, ph);
    let mut crop_freq = embed(crop, pw, ph);
    fft_2d(&mut image_freq, pw, ph, &forward, parallel);
    fft_2d(&mut crop_freq, pw, ph, &forward, parallel);

    if parallel {
        image_freq
            .par_iter_mut()
            .zip(crop_freq.par_iter())
            .for_each(|(i, t)| *i *= t.conj());
    } else {
        image_freq
            .iter_mut()
            .zip(crop_freq.iter())
            .for_each(|(i, t)| *i *= t.conj());
    }
    drop(crop_freq);

    fft_2d(&mut image_freq, pw, ph, &inverse, parallel);

    let scale = 1.0 / (pw * ph) as f64;
    let mut out = Vec::with_capacity(nx * ny);
    for y in 0..ny {
        for x in 0..nx {
            let value = image_freq[y * pw + x].re * scale;
            out.push(value.round().max(0.0) as u64);
        }
    }
    out
}

type PlanPair = (Arc<dyn Fft<f64>>, Arc<dyn Fft<f64>>);

fn embed(image: &RasterImage, pw: usize, ph: usize) -> Vec<Complex<f64>> {
    let mut buffer = vec![Complex::new(0.0, 0.0); pw * ph];
    for y in 0..image.height {
        for (x, &value) in image.row(y).iter().enumerate() {
            buffer[y * pw + x] = Complex::new(value as f64, 0.0);
        }
    }
    buffer
}

fn fft_2d(buffer: &mut Vec<Complex<f64>>, width: usize, height: usize, plans: &PlanPair, parallel: bool) {
    process_rows(buffer, width, &plans.0, parallel);
    let mut columns = transpose(buffer, width, height);
    process_rows(&mut columns, height, &plans.1, parallel);
    *buffer = transpose(&columns, height, width);
}

fn process_rows(buffer: &mut [Complex<f64>], len: usize, fft: &Arc<dyn Fft<f64>>, parallel: bool) {
    if parallel {
        buffer.par_chunks_mut(len).for_each(|row| fft.process(row));
    } else {
        // rustfft runs one transform per `len` chunk
        fft.process(buffer);
    }
}

fn transpose(buffer: &[Complex<f64>], width: usize, height: usize) -> Vec<Complex<f64>> {
    let mut out = vec![Complex::new(0.0, 0.0); width * height];
    for y in 0..height {
        for x in 0..width {
            out[x * height + y] = buffer[y * width + x];
        }
    }
    out
}

/// Smallest length `>= n` with no prime factor above 5.
fn fast_len(n: usize) -> usize {
    (n.max(1)..)
        .find(|&candidate| {
            let mut m = candidate;
            for p in [2, 3, 5] {
                while m % p == 0 {
                    m /= p;
                }
            }
            m == 1
        })
        .unwrap_or(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(x: usize, y: usize) -> u8 {
        let mut h = (x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ (y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        h ^= h >> 29;
        h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
        h ^= h >> 32;
        (h & 0xFF) as u8
    }

    #[test]
    fn test_fast_len() {
        assert_eq!(fast_len(1), 1);
        assert_eq!(fast_len(7), 8);
        assert_eq!(fast_len(11), 12);
        assert_eq!(fast_len(97), 100);
        assert_eq!(fast_len(1000), 1000);
        assert_eq!(fast_len(1001), 1024);
    }

    #[test]
    fn test_direct_small_case_by_hand() {
        let original = RasterImage::new(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let crop = RasterImage::new(2, 1, vec![1, 10]).unwrap();

        let terms = correlate_direct(&original, &crop, false);

        // positions (0,0) (1,0) (0,1) (1,1)
        assert_eq!(terms, vec![21, 32, 54, 65]);
    }

    #[test]
    fn test_fft_matches_direct() {
        let original = RasterImage::from_fn(41, 29, noise).unwrap();
        let crop = original.sub_image(7, 5, 11, 9).unwrap();

        let direct = correlate_direct(&original, &crop, false);
        let fft = correlate_fft(&original, &crop, false);

        assert_eq!(direct.len(), 31 * 21);
        assert_eq!(direct, fft);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let original = RasterImage::from_fn(37, 23, |x, y| noise(x + 3, y * 2)).unwrap();
        let crop = RasterImage::from_fn(6, 5, |x, y| noise(y, x)).unwrap();

        assert_eq!(correlate_direct(&original, &crop, true), correlate_direct(&original, &crop, false));
        assert_eq!(correlate_fft(&original, &crop, true), correlate_fft(&original, &crop, false));
    }

    #[test]
    fn test_fft_saturated_values_stay_exact() {
        let original = RasterImage::new(64, 48, vec![255u8; 64 * 48]).unwrap();
        let crop = RasterImage::new(20, 16, vec![255u8; 20 * 16]).unwrap();

        let fft = correlate_fft(&original, &crop, true);

        assert!(fft.iter().all(|&v| v == 20 * 16 * 255 * 255));
    }

    #[test]
    fn test_identity_crop_has_single_position() {
        let original = RasterImage::from_fn(17, 13, noise).unwrap();
        let direct = correlate_direct(&original, &original, false);
        let fft = correlate_fft(&original, &original, false);

        let energy: u64 = original.data.iter().map(|&v| v as u64 * v as u64).sum();
        assert_eq!(direct, vec![energy]);
        assert_eq!(fft, vec![energy]);
    }
}
