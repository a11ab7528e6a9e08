//! Image codec trait and shared types.
//!
//! The [`ImageCodec`] trait defines the four operations the crop pipeline
//! needs: identify, decode, crop, and encode. All of them work on in-memory
//! buffers; nothing here touches the filesystem.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_backend::RustCodec) on the `image` crate.

use super::params::FormatHint;
use crate::geometry::Rectangle;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("corrupt image: {0}")]
    CorruptImage(String),
    #[error("encoding failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A decoded, in-memory raster.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    image: DynamicImage,
}

impl DecodedRaster {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Black RGB raster of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(DynamicImage::new_rgb8(width, height))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Copy out the pixels inside `rect`.
    ///
    /// `rect` must be non-empty and lie within this raster.
    pub fn crop(&self, rect: Rectangle) -> DecodedRaster {
        debug_assert!(rect.fits_within(self.width(), self.height()));
        Self::new(
            self.image
                .crop_imm(rect.left, rect.top, rect.width(), rect.height()),
        )
    }
}

/// Trait for image codecs.
///
/// `Sync` so one codec can be shared across rayon workers.
pub trait ImageCodec: Sync {
    /// Read image dimensions from the header without decoding pixels.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, CodecError>;

    /// Decode an uploaded buffer.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedRaster, CodecError>;

    /// Extract a sub-rectangle. The caller resolves `rect` against this
    /// raster's own dimensions.
    fn crop(&self, raster: &DecodedRaster, rect: Rectangle) -> DecodedRaster {
        raster.crop(rect)
    }

    /// Encode a raster. Unknown hints fall back to PNG.
    fn encode(&self, raster: &DecodedRaster, hint: FormatHint) -> Result<Vec<u8>, CodecError>;
}
