//! High-level image operations.
//!
//! These functions combine crop geometry with codec execution. They take a
//! region and an uploaded buffer, resolve the region in that image's own
//! pixel space, and call the codec.

use super::backend::{CodecError, Dimensions, ImageCodec};
use super::params::FormatHint;
use crate::geometry::{CropRegion, Rectangle};
use thiserror::Error;

/// Why a single image could not be cropped.
///
/// Every variant is recoverable: the batch records it and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ItemError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("corrupt image: {0}")]
    CorruptImage(String),
    #[error("region collapses to empty crop")]
    EmptyCrop,
    #[error("encoding failed: {0}")]
    Encode(String),
    #[error("batch was cancelled before this image was processed")]
    Cancelled,
}

impl From<CodecError> for ItemError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::UnsupportedFormat(msg) => ItemError::UnsupportedFormat(msg),
            CodecError::CorruptImage(msg) => ItemError::CorruptImage(msg),
            CodecError::Encode(msg) => ItemError::Encode(msg),
        }
    }
}

/// An encoded crop ready to be archived.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedCrop {
    pub bytes: Vec<u8>,
    /// Dimensions of the source image.
    pub source: Dimensions,
    /// Rectangle cut out of the source.
    pub rect: Rectangle,
}

/// Get image dimensions using the codec.
pub fn get_dimensions(codec: &impl ImageCodec, bytes: &[u8]) -> Result<(u32, u32), CodecError> {
    let dims = codec.identify(bytes)?;
    Ok((dims.width, dims.height))
}

/// Plan the crop for an image of the given size without decoding it.
///
/// Returns `None` when the region collapses to nothing on this image.
pub fn plan_crop(region: &CropRegion, width: u32, height: u32) -> Option<Rectangle> {
    let rect = region.rect_for(width, height);
    (!rect.is_empty()).then_some(rect)
}

/// Decode, crop, and re-encode one uploaded buffer.
///
/// The region is resolved against the decoded raster's dimensions, never the
/// reference image's. The raster is dropped before returning.
pub fn crop_image(
    codec: &impl ImageCodec,
    bytes: &[u8],
    region: &CropRegion,
    hint: FormatHint,
) -> Result<EncodedCrop, ItemError> {
    let raster = codec.decode(bytes)?;
    let source = raster.dimensions();
    let rect = plan_crop(region, source.width, source.height).ok_or(ItemError::EmptyCrop)?;
    let cropped = codec.crop(&raster, rect);
    drop(raster);
    let bytes = codec.encode(&cropped, hint)?;
    Ok(EncodedCrop {
        bytes,
        source,
        rect,
    })
}
