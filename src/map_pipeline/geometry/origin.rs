//! Raster-to-world origin correction.
//!
//! A map origin is the world pose of the image's bottom-left pixel (row
//! `H - 1`, column 0). Image rows grow downward while world Y grows upward,
//! so removing pixels at the left edge moves the origin along +X and removing
//! pixels at the bottom edge moves it along +Y. Pixels removed at the top or
//! right only shrink the extent, which the image itself already encodes.

use tracing::info;

use crate::map_pipeline::geometry::margins::CropMargins;

/// World pose of a map's bottom-left pixel, yaw in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Origin {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.yaw]
    }

    pub fn has_valid_yaw(&self) -> bool {
        self.yaw.is_finite()
    }

    /// Same pose with a non-finite yaw replaced by 0.0.
    pub fn sanitized(&self) -> Self {
        Self {
            yaw: sanitize_yaw(self.yaw),
            ..*self
        }
    }
}

pub fn sanitize_yaw(yaw: f64) -> f64 {
    if yaw.is_finite() { yaw } else { 0.0 }
}

/// Origin of the cropped image in the original map's frame.
///
/// `new_x = x + left * resolution`, `new_y = y + bottom * resolution`, yaw is
/// kept after sanitation.
pub fn recalculate_origin(origin: &Origin, resolution: f64, margins: &CropMargins) -> Origin {
    let origin = origin.sanitized();

    let recalculated = Origin {
        x: origin.x + margins.left as f64 * resolution,
        y: origin.y + margins.bottom as f64 * resolution,
        yaw: origin.yaw,
    };

    info!(
        before = ?origin.to_array(),
        after = ?recalculated.to_array(),
        resolution,
        "Recalculated origin"
    );

    recalculated
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the origin shift is linear in the left and bottom margins.
        #[test]
        fn prop_shift_is_linear_in_margins(
            x in -1000.0f64..1000.0,
            y in -1000.0f64..1000.0,
            yaw in -3.2f64..3.2,
            resolution in 0.001f64..2.0,
            (left, right, top, bottom) in (0i64..5000, 0i64..5000, 0i64..5000, 0i64..5000),
        ) {
            let margins = CropMargins::new(left, right, top, bottom);
            let origin = recalculate_origin(&Origin::new(x, y, yaw), resolution, &margins);

            let tolerance = 1e-9 * (1.0 + x.abs() + y.abs() + 5000.0 * resolution);
            prop_assert!((origin.x - x - left as f64 * resolution).abs() < tolerance);
            prop_assert!((origin.y - y - bottom as f64 * resolution).abs() < tolerance);
            prop_assert_eq!(origin.yaw, yaw);
        }

        /// Property: finite yaw passes through sanitation untouched.
        #[test]
        fn prop_finite_yaw_unchanged(yaw in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
            prop_assert_eq!(sanitize_yaw(yaw), yaw);
        }
    }
}
