//! Pure Rust codec on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format sniffing | `ImageReader::with_guessed_format` (magic bytes, not MIME) |
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Decode (PNG, JPEG) | `image` crate decoders |
//! | Crop | `DynamicImage::crop_imm` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with [`Quality`] |

use super::backend::{CodecError, DecodedRaster, Dimensions, ImageCodec};
use super::params::{FormatHint, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageError, ImageFormat, ImageReader};
use std::io::Cursor;

/// Input encodings the codec accepts. Everything else is `UnsupportedFormat`,
/// even when the `image` crate could recognise it.
const ACCEPTED_FORMATS: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg];

/// Pure Rust codec using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec {
    quality: Quality,
}

impl RustCodec {
    pub fn new() -> Self {
        Self {
            quality: Quality::default(),
        }
    }

    /// Codec that encodes JPEG output at `quality`.
    pub fn with_quality(quality: Quality) -> Self {
        Self { quality }
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Open an in-memory reader with the format sniffed from magic bytes.
fn open_reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, CodecError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::CorruptImage(e.to_string()))?;
    match reader.format() {
        Some(format) if ACCEPTED_FORMATS.contains(&format) => Ok(reader),
        Some(format) => Err(CodecError::UnsupportedFormat(format!(
            "{format:?} is not accepted (PNG or JPEG only)"
        ))),
        None => Err(CodecError::UnsupportedFormat(
            "not a recognized raster encoding".to_string(),
        )),
    }
}

fn decode_error(err: ImageError) -> CodecError {
    match err {
        ImageError::Unsupported(e) => CodecError::UnsupportedFormat(e.to_string()),
        other => CodecError::CorruptImage(other.to_string()),
    }
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    image
        .write_with_encoder(PngEncoder::new(&mut buf))
        .map_err(|e| CodecError::Encode(format!("PNG encode failed: {e}")))?;
    Ok(buf)
}

/// JPEG has no alpha channel and no 16-bit mode, so the raster is flattened
/// to RGB8 first.
fn encode_jpeg(image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CodecError> {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
    rgb.write_with_encoder(encoder)
        .map_err(|e| CodecError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

impl ImageCodec for RustCodec {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, CodecError> {
        let (width, height) = open_reader(bytes)?
            .into_dimensions()
            .map_err(decode_error)?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedRaster, CodecError> {
        let image = open_reader(bytes)?.decode().map_err(decode_error)?;
        Ok(DecodedRaster::new(image))
    }

    fn encode(&self, raster: &DecodedRaster, hint: FormatHint) -> Result<Vec<u8>, CodecError> {
        match hint {
            FormatHint::Jpeg => encode_jpeg(raster.image(), self.quality),
            FormatHint::Png | FormatHint::Unknown => encode_png(raster.image()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rectangle;
    use crate::test_helpers::{jpeg_bytes, png_bytes, rgba_png_bytes};

    #[test]
    fn identify_png_reads_header() {
        let codec = RustCodec::new();
        let dims = codec.identify(&png_bytes(200, 150)).unwrap();
        assert_eq!(dims, Dimensions { width: 200, height: 150 });
    }

    #[test]
    fn identify_jpeg_reads_header() {
        let codec = RustCodec::new();
        let dims = codec.identify(&jpeg_bytes(64, 48)).unwrap();
        assert_eq!(dims, Dimensions { width: 64, height: 48 });
    }

    #[test]
    fn decode_png() {
        let codec = RustCodec::new();
        let raster = codec.decode(&png_bytes(40, 30)).unwrap();
        assert_eq!(raster.width(), 40);
        assert_eq!(raster.height(), 30);
    }

    #[test]
    fn decode_garbage_is_unsupported() {
        let codec = RustCodec::new();
        let result = codec.decode(b"definitely not an image");
        assert!(matches!(result, Err(CodecError::UnsupportedFormat(_))));
    }

    #[test]
    fn decode_recognized_but_excluded_format_is_unsupported() {
        // GIF magic; recognised by the sniffer but outside PNG/JPEG
        let codec = RustCodec::new();
        let result = codec.decode(b"GIF89a\x01\x00\x01\x00\x00\x00\x00;");
        assert!(matches!(result, Err(CodecError::UnsupportedFormat(_))));
    }

    #[test]
    fn decode_truncated_png_is_corrupt() {
        let codec = RustCodec::new();
        let mut bytes = png_bytes(32, 32);
        bytes.truncate(40);
        let result = codec.decode(&bytes);
        assert!(matches!(result, Err(CodecError::CorruptImage(_))));
    }

    #[test]
    fn encode_png_round_trip_keeps_crop_dimensions() {
        let codec = RustCodec::new();
        let raster = codec.decode(&png_bytes(100, 200)).unwrap();
        let rect = Rectangle::new(10, 16, 90, 200);
        let cropped = codec.crop(&raster, rect);

        let encoded = codec.encode(&cropped, FormatHint::Png).unwrap();
        assert_eq!(image::guess_format(&encoded).unwrap(), ImageFormat::Png);

        let decoded = codec.decode(&encoded).unwrap();
        assert_eq!(decoded.width(), rect.right - rect.left);
        assert_eq!(decoded.height(), rect.bottom - rect.top);
    }

    #[test]
    fn encode_jpeg_round_trip_keeps_crop_dimensions() {
        let codec = RustCodec::with_quality(Quality::new(80));
        let raster = codec.decode(&jpeg_bytes(120, 90)).unwrap();
        let cropped = codec.crop(&raster, Rectangle::new(0, 30, 120, 90));

        let encoded = codec.encode(&cropped, FormatHint::Jpeg).unwrap();
        assert_eq!(image::guess_format(&encoded).unwrap(), ImageFormat::Jpeg);

        let decoded = codec.decode(&encoded).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 60));
    }

    #[test]
    fn encode_unknown_hint_falls_back_to_png() {
        let codec = RustCodec::new();
        let raster = codec.decode(&jpeg_bytes(16, 16)).unwrap();
        let encoded = codec.encode(&raster, FormatHint::Unknown).unwrap();
        assert_eq!(image::guess_format(&encoded).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn encode_jpeg_from_rgba_source() {
        let codec = RustCodec::new();
        let raster = codec.decode(&rgba_png_bytes(24, 24)).unwrap();
        assert!(raster.image().color().has_alpha());

        let encoded = codec.encode(&raster, FormatHint::Jpeg).unwrap();
        assert_eq!(image::guess_format(&encoded).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn crop_copies_expected_pixels() {
        let codec = RustCodec::new();
        let raster = codec.decode(&png_bytes(10, 10)).unwrap();
        let cropped = codec.crop(&raster, Rectangle::new(3, 4, 6, 8));

        let original = raster.image().to_rgb8();
        let result = cropped.image().to_rgb8();
        assert_eq!(result.get_pixel(0, 0), original.get_pixel(3, 4));
        assert_eq!(result.get_pixel(2, 3), original.get_pixel(5, 7));
    }
}
