use std::path::Path;

use tracing::info;

use crate::map_pipeline::geometry::Origin;
use crate::map_pipeline::metadata::types::MapMetadata;

/// New metadata record for the cropped image.
///
/// Only `origin` and `image` change; resolution and every pass-through key
/// are carried over untouched.
pub fn mutate_metadata(metadata: &MapMetadata, origin: Origin, crop_reference: &Path) -> MapMetadata {
    let image = rebase_image_reference(&metadata.image, crop_reference);
    info!(image = %image, "Rewrote image reference");

    MapMetadata {
        resolution: metadata.resolution,
        origin,
        image,
        record: metadata.record.clone(),
    }
}

/// Joins the directory of `original_reference` with the file name of `crop`.
///
/// The crop's own directory is dropped. The original directory is kept
/// verbatim, relative or absolute, using `/` like the map files do.
pub fn rebase_image_reference(original_reference: &str, crop: &Path) -> String {
    let file_name = crop
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| crop.to_string_lossy().into_owned());

    match directory_of(original_reference) {
        "" => file_name,
        dir if dir.ends_with('/') => format!("{}{}", dir, file_name),
        dir => format!("{}/{}", dir, file_name),
    }
}

/// Directory component of a `/`-separated path, trailing separators removed
/// unless the directory is the root itself.
fn directory_of(reference: &str) -> &str {
    match reference.rfind('/') {
        None => "",
        Some(index) => {
            let head = &reference[..=index];
            let trimmed = head.trim_end_matches('/');
            if trimmed.is_empty() { head } else { trimmed }
        }
    }
}
