//! YAML codec for occupancy map metadata.
//!
//! Reads the `map_server` style record:
//!
//! ```yaml
//! image: maps/office.pgm
//! resolution: 0.05
//! origin: [-10.0, -10.0, 0.0]
//! negate: 0
//! occupied_thresh: 0.65
//! free_thresh: 0.196
//! ```
//!
//! `origin` may hold two values (yaw defaults to 0.0) or be missing entirely
//! (`[0, 0, 0]`). Numbers written as strings are accepted. A yaw that is not
//! a number at all is read as NaN and later sanitized to 0.0.

use std::io::Write;

use serde_yml::{Mapping, Value};
use tracing::debug;

use crate::map_pipeline::common::error::{CropError, Result};
use crate::map_pipeline::geometry::Origin;
use crate::map_pipeline::metadata::codec::MetadataCodec;
use crate::map_pipeline::metadata::types::MapMetadata;

pub struct YamlMetadataCodec;

impl MetadataCodec for YamlMetadataCodec {
    fn decode(&self, text: &str) -> Result<MapMetadata> {
        let value: Value =
            serde_yml::from_str(text).map_err(|e| CropError::MetadataParseError(e.to_string()))?;

        let record = match value {
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(CropError::MetadataParseError(format!(
                    "expected a mapping at the top level, found {}",
                    kind(&other)
                )));
            }
        };

        let resolution = parse_resolution(&record)?;
        let origin = parse_origin(&record)?;
        let image = match record.get("image") {
            Some(Value::String(path)) => path.clone(),
            Some(other) => {
                return Err(CropError::MetadataParseError(format!(
                    "`image` must be a string, found {}",
                    kind(other)
                )));
            }
            None => return Err(CropError::MissingField("image")),
        };

        debug!(resolution, origin = ?origin.to_array(), image = %image, "Decoded map metadata");

        Ok(MapMetadata {
            resolution,
            origin,
            image,
            record,
        })
    }

    fn encode(&self, metadata: &MapMetadata, output: &mut dyn Write) -> Result<()> {
        let text = serde_yml::to_string(&Value::Mapping(metadata.to_record()))
            .map_err(|e| CropError::OutputWriteError(e.to_string()))?;
        output.write_all(text.as_bytes())?;
        Ok(())
    }
}

fn parse_resolution(record: &Mapping) -> Result<f64> {
    let value = record
        .get("resolution")
        .ok_or(CropError::MissingField("resolution"))?;
    let resolution = as_number(value).ok_or_else(|| {
        CropError::MetadataParseError(format!("`resolution` must be a number, found {}", kind(value)))
    })?;

    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(CropError::InvalidResolution(resolution));
    }
    Ok(resolution)
}

fn parse_origin(record: &Mapping) -> Result<Origin> {
    let values = match record.get("origin") {
        None | Some(Value::Null) => return Ok(Origin::new(0.0, 0.0, 0.0)),
        Some(Value::Sequence(values)) => values,
        Some(other) => {
            return Err(CropError::MetadataParseError(format!(
                "`origin` must be a sequence, found {}",
                kind(other)
            )));
        }
    };

    if values.len() < 2 {
        return Err(CropError::MetadataParseError(format!(
            "`origin` needs at least 2 values, found {}",
            values.len()
        )));
    }

    let coordinate = |index: usize| {
        as_number(&values[index]).ok_or_else(|| {
            CropError::MetadataParseError(format!("`origin[{}]` must be a number", index))
        })
    };
    let x = coordinate(0)?;
    let y = coordinate(1)?;
    let yaw = values.get(2).map_or(0.0, |v| as_number(v).unwrap_or(f64::NAN));

    Ok(Origin::new(x, y, yaw))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
