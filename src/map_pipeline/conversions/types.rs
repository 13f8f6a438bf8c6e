//! Crop origin configuration and report types

use crate::map_pipeline::common::{Advisory, PipelineTimings};
use crate::map_pipeline::geometry::{CropMargins, Origin};
use crate::map_pipeline::matching::MatchResult;
use crate::map_pipeline::metadata::MapMetadata;

/// Configuration for the crop origin pipeline
#[derive(Debug, Clone)]
pub struct CropOriginConfig {
    /// Whether to check raster sizes against `max_dimension` after decoding
    pub validate_dimensions: bool,
    /// Largest accepted edge length in pixels, `None` for no limit
    pub max_dimension: Option<usize>,
    /// Best-score level above which a weak-match advisory is raised
    pub score_warning: Option<f64>,
    /// Run the correlation search on the rayon pool
    pub parallel: bool,
}

impl Default for CropOriginConfig {
    fn default() -> Self {
        Self {
            validate_dimensions: true,
            max_dimension: Some(50_000),
            score_warning: Some(0.05),
            parallel: true,
        }
    }
}

impl CropOriginConfig {
    pub fn builder() -> CropOriginConfigBuilder {
        CropOriginConfigBuilder::default()
    }
}

/// Builder for CropOriginConfig
#[derive(Default)]
pub struct CropOriginConfigBuilder {
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
    score_warning: Option<Option<f64>>,
    parallel: Option<bool>,
}

impl CropOriginConfigBuilder {
    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn score_warning(mut self, threshold: Option<f64>) -> Self {
        self.score_warning = Some(threshold);
        self
    }

    pub fn parallel(mut self, enable: bool) -> Self {
        self.parallel = Some(enable);
        self
    }

    pub fn build(self) -> CropOriginConfig {
        let default = CropOriginConfig::default();
        CropOriginConfig {
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
            score_warning: self.score_warning.unwrap_or(default.score_warning),
            parallel: self.parallel.unwrap_or(default.parallel),
        }
    }
}

/// Everything one run derived, in pipeline order.
#[derive(Debug, Clone)]
pub struct CropReport {
    pub original_size: (usize, usize),
    pub crop_size: (usize, usize),
    pub match_result: MatchResult,
    pub margins: CropMargins,
    /// Origin as read from the source record, before yaw sanitation
    pub source_origin: Origin,
    /// Origin the margins were applied to
    pub sanitized_origin: Origin,
    pub new_origin: Origin,
    /// Metadata to write for the cropped image
    pub metadata: MapMetadata,
    pub advisories: Vec<Advisory>,
    pub timings: PipelineTimings,
}

impl CropReport {
    pub fn is_clean(&self) -> bool {
        self.advisories.is_empty()
    }

    pub fn has_low_confidence(&self) -> bool {
        self.advisories
            .iter()
            .any(|a| matches!(a, Advisory::LowConfidenceMatch { .. }))
    }
}
