use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropError {
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode grayscale image: {0}")]
    ImageDecodeError(String),

    #[error(
        "Cropped image {crop_width}x{crop_height} is larger than original {original_width}x{original_height}, were the arguments swapped?"
    )]
    DimensionMismatch {
        original_width: usize,
        original_height: usize,
        crop_width: usize,
        crop_height: usize,
    },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Failed to parse map metadata: {0}")]
    MetadataParseError(String),

    #[error("Map metadata is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Map resolution must be a positive number, got {0}")]
    InvalidResolution(f64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CropError>;
