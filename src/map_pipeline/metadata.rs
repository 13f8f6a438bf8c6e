//! Map metadata module
//!
//! Typed view of the map YAML record, its codec, and the crop rewrite.

mod codec;
mod mutator;
pub mod types;
mod yaml_codec;

pub use codec::MetadataCodec;
pub use mutator::{mutate_metadata, rebase_image_reference};
pub use types::MapMetadata;
pub use yaml_codec::YamlMetadataCodec;
