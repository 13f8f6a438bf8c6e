use std::io::Write;

use crate::map_pipeline::common::error::Result;
use crate::map_pipeline::metadata::types::MapMetadata;

pub trait MetadataCodec {
    fn decode(&self, text: &str) -> Result<MapMetadata>;
    fn encode(&self, metadata: &MapMetadata, output: &mut dyn Write) -> Result<()>;
}
