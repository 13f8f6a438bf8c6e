use std::io::Write;
use std::path::Path;

use tracing::{info, instrument, warn};

use crate::map_pipeline::{
    common::{Advisory, CropError, PipelineTimings, Result},
    conversions::types::{CropOriginConfig, CropReport},
    geometry::{recalculate_origin, resolve_match},
    matching::TemplateMatchEngine,
    metadata::{MetadataCodec, YamlMetadataCodec, mutate_metadata},
    raster::{GrayscaleReader, ImageCrateReader, RasterImage, RasterPair},
};

/// Re-anchors a cropped map in the frame of the map it was cut from.
///
/// Steps: decode metadata (yaw sanitized), decode both rasters, locate the
/// crop, derive margins, shift the origin, rewrite origin and image path.
pub struct CropOriginPipeline<R: GrayscaleReader, M: MetadataCodec> {
    reader: R,
    codec: M,
    config: CropOriginConfig,
}

impl CropOriginPipeline<ImageCrateReader, YamlMetadataCodec> {
    pub fn new(config: CropOriginConfig) -> Self {
        Self {
            reader: ImageCrateReader,
            codec: YamlMetadataCodec,
            config,
        }
    }
}

impl<R: GrayscaleReader, M: MetadataCodec> CropOriginPipeline<R, M> {
    pub fn with_custom(reader: R, codec: M, config: CropOriginConfig) -> Self {
        Self {
            reader,
            codec,
            config,
        }
    }

    fn validate_dimensions(&self, image: &RasterImage) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if let Some(max) = self.config.max_dimension {
            if image.width > max || image.height > max {
                warn!(
                    "Image dimensions {}x{} exceed maximum {}",
                    image.width, image.height, max
                );
                return Err(CropError::InvalidDimensions(image.width, image.height));
            }
        }

        Ok(())
    }

    /// Runs the whole computation in memory.
    ///
    /// `crop_reference` is only used for its file name, which becomes the
    /// image reference of the new record.
    #[instrument(skip_all, fields(crop = %crop_reference.display()))]
    pub fn process(
        &self,
        metadata_text: &str,
        original_data: &[u8],
        crop_data: &[u8],
        crop_reference: &Path,
    ) -> Result<CropReport> {
        let mut timings = PipelineTimings::new();
        let mut advisories = Vec::new();

        let metadata = {
            let _span = tracing::info_span!("decode_metadata").entered();
            timings.measure("decode_metadata", || self.codec.decode(metadata_text))?
        };
        let source_origin = metadata.origin;
        let (metadata, yaw_advisory) = metadata.sanitized();
        advisories.extend(yaw_advisory);

        info!(origin = ?source_origin.to_array(), resolution = metadata.resolution, "Source map");

        let rasters = {
            let _span = tracing::info_span!("decode_images").entered();
            timings.measure("decode_images", || -> Result<RasterPair> {
                let original = self.reader.read_gray(original_data)?;
                let crop = self.reader.read_gray(crop_data)?;
                Ok(RasterPair::new(original, crop))
            })?
        };

        {
            let _span = tracing::info_span!("validate_dimensions").entered();
            self.validate_dimensions(&rasters.original)?;
            self.validate_dimensions(&rasters.crop)?;
        }

        info!(
            "Original size: {}x{}, cropped size: {}x{}",
            rasters.original.width, rasters.original.height, rasters.crop.width, rasters.crop.height
        );

        let match_result = {
            let _span = tracing::info_span!("template_match").entered();
            let engine = TemplateMatchEngine::with_parallelism(self.config.parallel);
            timings.measure("template_match", || engine.locate(&rasters.original, &rasters.crop))?
        };

        if match_result.is_ambiguous() {
            let advisory = Advisory::AmbiguousMatch {
                candidates: match_result.ties,
            };
            warn!("{}", advisory);
            advisories.push(advisory);
        }
        if let Some(threshold) = self.config.score_warning {
            if match_result.score > threshold {
                let advisory = Advisory::WeakMatch {
                    score: match_result.score,
                    threshold,
                };
                warn!("{}", advisory);
                advisories.push(advisory);
            }
        }

        let resolved = timings.measure("resolve_margins", || {
            resolve_match(
                &match_result,
                rasters.original.dimensions(),
                rasters.crop.dimensions(),
            )
        });
        advisories.extend(resolved.advisory.clone());

        let new_origin = timings.measure("recalculate_origin", || {
            recalculate_origin(&metadata.origin, metadata.resolution, &resolved.margins)
        });
        let new_metadata = mutate_metadata(&metadata, new_origin, crop_reference);

        info!(
            origin = ?new_origin.to_array(),
            image = %new_metadata.image,
            advisories = advisories.len(),
            "Crop origin computed"
        );

        Ok(CropReport {
            original_size: rasters.original.dimensions(),
            crop_size: rasters.crop.dimensions(),
            match_result,
            margins: resolved.margins,
            source_origin,
            sanitized_origin: metadata.origin,
            new_origin,
            metadata: new_metadata,
            advisories,
            timings,
        })
    }

    /// Serializes the report's metadata with this pipeline's codec.
    pub fn encode(&self, report: &CropReport, output: &mut dyn Write) -> Result<()> {
        self.codec.encode(&report.metadata, output)
    }

    /// File-based run: checks inputs, computes, then writes the new record.
    ///
    /// The output is written only after every step succeeded; on error no
    /// output file is created.
    #[instrument(skip_all)]
    pub fn process_files<A, B, C, D>(
        &self,
        metadata_path: A,
        original_path: B,
        crop_path: C,
        output_path: D,
    ) -> Result<CropReport>
    where
        A: AsRef<Path>,
        B: AsRef<Path>,
        C: AsRef<Path>,
        D: AsRef<Path>,
    {
        let metadata_path = metadata_path.as_ref();
        let original_path = original_path.as_ref();
        let crop_path = crop_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            metadata = %metadata_path.display(),
            original = %original_path.display(),
            crop = %crop_path.display(),
            output = %output_path.display(),
            "Updating map metadata for crop"
        );

        for path in [metadata_path, original_path, crop_path] {
            if !path.is_file() {
                return Err(CropError::MissingInput(path.to_path_buf()));
            }
        }

        let mut timings = PipelineTimings::new();
        let (metadata_text, original_data, crop_data) = {
            let _span = tracing::info_span!("read_input_files").entered();
            timings.measure("read_input_files", || -> Result<_> {
                let metadata_text = std::fs::read_to_string(metadata_path).map_err(|e| {
                    CropError::InputReadError(format!("{}: {}", metadata_path.display(), e))
                })?;
                let original_data = std::fs::read(original_path).map_err(|e| {
                    CropError::InputReadError(format!("{}: {}", original_path.display(), e))
                })?;
                let crop_data = std::fs::read(crop_path).map_err(|e| {
                    CropError::InputReadError(format!("{}: {}", crop_path.display(), e))
                })?;
                Ok((metadata_text, original_data, crop_data))
            })?
        };

        let mut report = self.process(&metadata_text, &original_data, &crop_data, crop_path)?;

        {
            let _span = tracing::info_span!("write_metadata").entered();
            timings.merge(&report.timings);
            timings.measure("write_metadata", || -> Result<()> {
                let mut buffer = Vec::new();
                self.codec.encode(&report.metadata, &mut buffer)?;
                std::fs::write(output_path, &buffer).map_err(|e| {
                    CropError::OutputWriteError(format!("{}: {}", output_path.display(), e))
                })
            })?;
        }
        timings.log_summary();
        report.timings = timings;

        info!(
            output = %output_path.display(),
            image = %report.metadata.image,
            "Wrote map metadata"
        );

        Ok(report)
    }

    pub fn config(&self) -> &CropOriginConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: CropOriginConfig) {
        self.config = config;
    }
}
