//! Common utilities module
//!
//! Error types, advisories and step timing shared across the map pipeline.

pub mod advisory;
pub mod error;
pub mod timing;

pub use advisory::Advisory;
pub use error::{CropError, Result};
pub use timing::{PipelineTimings, StepTiming, Timer};
