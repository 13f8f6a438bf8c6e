//! Map crop pipeline module
//!
//! Recovers where a cropped occupancy map sits inside its source map and
//! rewrites the crop's metadata so both share one world frame. Raster
//! decoding, crop localization, geometry and metadata handling live in
//! separate modules; `conversions` ties them together.

pub mod common;
pub mod conversions;
pub mod geometry;
pub mod matching;
pub mod metadata;
pub mod raster;

pub use common::{Advisory, CropError, PipelineTimings, Result};

pub use raster::{GrayscaleReader, ImageCrateReader, RasterImage, RasterPair};

pub use matching::{MatchResult, TemplateMatchEngine};

pub use geometry::{CropMargins, Origin, recalculate_origin, resolve_margins};

pub use metadata::{MapMetadata, MetadataCodec, YamlMetadataCodec, mutate_metadata};

pub use conversions::{CropOriginConfig, CropOriginConfigBuilder, CropOriginPipeline, CropReport};
