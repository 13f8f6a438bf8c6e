//! Pipeline conversions module
//!
//! Orchestration of a full crop origin update, in memory or file to file.

mod crop_origin;
pub mod types;


pub use crop_origin::CropOriginPipeline;
pub use types::{CropOriginConfig, CropOriginConfigBuilder, CropReport};
