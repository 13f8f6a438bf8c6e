//! Crop localization module
//!
//! Normalized-SSD template matching of a crop against its source map.

mod correlation;
mod engine;
mod integral;
pub mod types;

pub use engine::TemplateMatchEngine;
pub use types::MatchResult;
