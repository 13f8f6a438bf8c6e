//! Crop geometry module
//!
//! Pixel margins of a crop and the world-frame origin they imply.

pub mod margins;
pub mod origin;

pub use margins::{CropMargins, ResolvedMargins, resolve_margins, resolve_match};
pub use origin::{Origin, recalculate_origin, sanitize_yaw};
