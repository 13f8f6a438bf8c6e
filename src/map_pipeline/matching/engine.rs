use rayon::prelude::*;
use tracing::{info, instrument};

use crate::map_pipeline::common::error::{CropError, Result};
use crate::map_pipeline::matching::correlation::{cross_correlate, search_extent};
use crate::map_pipeline::matching::integral::SquaredIntegral;
use crate::map_pipeline::matching::types::MatchResult;
use crate::map_pipeline::raster::RasterImage;

/// Locates a crop inside the map it was cut from.
///
/// Every window position is scored with the normalized sum of squared
/// differences
///
/// ```text
/// score(x, y) = Σ (T - I)² / sqrt(Σ T² · Σ I²)
/// ```
///
/// where `T` is the crop and `I` the original window at `(x, y)`. The
/// numerator expands to `Σ T² + Σ I² - 2 Σ T·I`; window energies come from a
/// summed-area table and the cross terms from [`cross_correlate`], so the
/// whole search costs a few FFTs instead of `W0·H0·W1·H1` multiply-adds.
///
/// The lowest score wins. Exact ties go to the first position in row-major
/// order (top row first, then leftmost), and the tie count is reported with
/// the result.
#[derive(Debug, Clone)]
pub struct TemplateMatchEngine {
    parallel: bool,
}

impl Default for TemplateMatchEngine {
    fn default() -> Self {
        Self { parallel: true }
    }
}

#[derive(Debug, Clone, Copy)]
struct RowBest {
    x: usize,
    score: f64,
    ties: usize,
}

impl TemplateMatchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallelism(parallel: bool) -> Self {
        Self { parallel }
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Returns the top-left position of the best crop alignment.
    ///
    /// Fails with [`CropError::DimensionMismatch`] when the crop is larger
    /// than the original along either axis, which usually means the two
    /// images were passed in the wrong order.
    #[instrument(skip_all, fields(original = ?original.dimensions(), crop = ?crop.dimensions()))]
    pub fn locate(&self, original: &RasterImage, crop: &RasterImage) -> Result<MatchResult> {
        if crop.width > original.width || crop.height > original.height {
            return Err(CropError::DimensionMismatch {
                original_width: original.width,
                original_height: original.height,
                crop_width: crop.width,
                crop_height: crop.height,
            });
        }

        let (nx, ny) = search_extent(original, crop);
        let integral = SquaredIntegral::new(original);
        let template_energy: u64 = crop.data.iter().map(|&v| v as u64 * v as u64).sum();
        let cross = cross_correlate(original, crop, self.parallel);

        let row_best = |y: usize| -> RowBest {
            let mut best = RowBest {
                x: 0,
                score: f64::INFINITY,
                ties: 0,
            };
            for x in 0..nx {
                let window_energy = integral.window_sum(x, y, crop.width, crop.height);
                let score = normalized_sqdiff(template_energy, window_energy, cross[y * nx + x]);
                if score < best.score {
                    best = RowBest { x, score, ties: 1 };
                } else if score == best.score {
                    best.ties += 1;
                }
            }
            best
        };

        let rows: Vec<RowBest> = if self.parallel {
            (0..ny).into_par_iter().map(row_best).collect()
        } else {
            (0..ny).map(row_best).collect()
        };

        // Rows are folded top to bottom so the first minimum in scan order survives
        let mut winner: Option<(usize, RowBest)> = None;
        for (y, row) in rows.into_iter().enumerate() {
            match winner.as_mut() {
                None => winner = Some((y, row)),
                Some((best_y, best)) => {
                    if row.score < best.score {
                        *best_y = y;
                        *best = row;
                    } else if row.score == best.score {
                        best.ties += row.ties;
                    }
                }
            }
        }
        let (y, best) = winner.ok_or(CropError::InvalidDimensions(crop.width, crop.height))?;

        info!(
            x = best.x,
            y,
            score = best.score,
            ties = best.ties,
            "Template match"
        );

        Ok(MatchResult {
            x: best.x,
            y,
            score: best.score,
            ties: best.ties,
        })
    }
}

/// Normalized SSD from the three exact sums, saturated at 1.0.
///
/// A zero denominator means the crop or the window is entirely black; that
/// pair scores 0.0 only when both are black.
pub(crate) fn normalized_sqdiff(template_energy: u64, window_energy: u64, cross: u64) -> f64 {
    let ssd = (template_energy + window_energy).saturating_sub(2 * cross);
    let denominator = ((template_energy as f64) * (window_energy as f64)).sqrt();
    if denominator == 0.0 {
        return if ssd == 0 { 0.0 } else { 1.0 };
    }
    (ssd as f64 / denominator).min(1.0)
}
