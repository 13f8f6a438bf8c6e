use tracing::{info, warn};

use crate::map_pipeline::common::advisory::Advisory;
use crate::map_pipeline::matching::MatchResult;

/// Pixels removed from each side of the original to produce the crop.
///
/// Signed on purpose: a negative value means the match does not describe a
/// rectangular cut and has to be surfaced, not clamped away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CropMargins {
    pub left: i64,
    pub right: i64,
    pub top: i64,
    pub bottom: i64,
}

impl CropMargins {
    pub fn new(left: i64, right: i64, top: i64, bottom: i64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn min(&self) -> i64 {
        self.left.min(self.right).min(self.top).min(self.bottom)
    }

    pub fn is_low_confidence(&self) -> bool {
        self.min() < 0
    }
}

/// Margins derived from a match, with the advisory raised for them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMargins {
    pub margins: CropMargins,
    pub advisory: Option<Advisory>,
}

/// Turns the crop's top-left position into per-side margins.
///
/// `original` and `crop` are `(width, height)` pairs. Never fails; a negative
/// margin yields [`Advisory::LowConfidenceMatch`] and the caller carries on.
pub fn resolve_margins(x0: i64, y0: i64, original: (usize, usize), crop: (usize, usize)) -> ResolvedMargins {
    let (w0, h0) = (original.0 as i64, original.1 as i64);
    let (w1, h1) = (crop.0 as i64, crop.1 as i64);

    let margins = CropMargins {
        left: x0,
        top: y0,
        right: w0 - (x0 + w1),
        bottom: h0 - (y0 + h1),
    };

    info!(
        left = margins.left,
        right = margins.right,
        top = margins.top,
        bottom = margins.bottom,
        "Estimated crop margins"
    );

    let advisory = if margins.is_low_confidence() {
        warn!("Negative crop margin, the match may be inaccurate, please check manually");
        Some(Advisory::LowConfidenceMatch { margins })
    } else {
        None
    };

    ResolvedMargins { margins, advisory }
}

/// [`resolve_margins`] for a [`MatchResult`].
pub fn resolve_match(result: &MatchResult, original: (usize, usize), crop: (usize, usize)) -> ResolvedMargins {
    resolve_margins(result.x as i64, result.y as i64, original, crop)
}
