//! Map metadata types

use serde_yml::{Mapping, Value};
use tracing::warn;

use crate::map_pipeline::common::advisory::Advisory;
use crate::map_pipeline::geometry::Origin;

/// Occupancy map metadata record.
///
/// `resolution`, `origin` and `image` are the typed fields the crop logic
/// works with. `record` keeps the full source mapping so thresholds, mode and
/// any custom keys are written back exactly as they were read.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMetadata {
    /// Meters per pixel, always positive
    pub resolution: f64,
    /// World pose of the image's bottom-left pixel
    pub origin: Origin,
    /// Path of the image the record describes
    pub image: String,
    /// Source record, in source key order
    pub record: Mapping,
}

impl MapMetadata {
    /// Returns the record with a non-finite yaw replaced by 0.0, plus the
    /// advisory describing the replacement when one happened.
    pub fn sanitized(self) -> (Self, Option<Advisory>) {
        if self.origin.has_valid_yaw() {
            return (self, None);
        }

        let found = format!("{}", self.origin.yaw);
        warn!(yaw = %found, "Origin yaw is not a finite number, using 0.0");

        let origin = self.origin.sanitized();
        (Self { origin, ..self }, Some(Advisory::InvalidYawValue { found }))
    }

    /// Source record with `origin` and `image` taken from the typed fields.
    ///
    /// Existing keys keep their position; `origin` is always three numbers.
    pub fn to_record(&self) -> Mapping {
        let mut record = self.record.clone();
        let origin = self.origin.to_array().iter().map(|&v| Value::from(v)).collect();
        record.insert(Value::from("origin"), Value::Sequence(origin));
        record.insert(Value::from("image"), Value::from(self.image.clone()));
        record
    }
}
