//! Non-fatal findings raised while processing a crop.
//!
//! An advisory never stops the pipeline. It is logged at `warn` and returned
//! in the report so the operator can check the result by hand.

use std::fmt;

use crate::map_pipeline::geometry::CropMargins;

#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// At least one margin is negative: the matched window does not sit
    /// inside the original as a clean rectangular cut.
    LowConfidenceMatch { margins: CropMargins },
    /// The input yaw was not a finite number and was replaced by 0.0.
    InvalidYawValue { found: String },
    /// Several window positions share the best score; the first one in
    /// row-major order was used.
    AmbiguousMatch { candidates: usize },
    /// The best score is above the configured warning threshold.
    WeakMatch { score: f64, threshold: f64 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::LowConfidenceMatch { margins } => write!(
                f,
                "negative crop margin (left={}, right={}, top={}, bottom={}), match may be wrong, please check manually",
                margins.left, margins.right, margins.top, margins.bottom
            ),
            Advisory::InvalidYawValue { found } => {
                write!(f, "origin yaw `{}` is not a finite number, replaced with 0.0", found)
            }
            Advisory::AmbiguousMatch { candidates } => write!(
                f,
                "{} positions tie for the best score, using the first in scan order",
                candidates
            ),
            Advisory::WeakMatch { score, threshold } => write!(
                f,
                "best match score {:.6} exceeds warning threshold {:.6}",
                score, threshold
            ),
        }
    }
}
