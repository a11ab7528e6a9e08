//! Shared test utilities.
//!
//! Two kinds of fixture:
//!
//! - **Real buffers** ([`png_bytes`], [`jpeg_bytes`], [`rgba_png_bytes`]):
//!   gradient images encoded with the `image` crate, for codec tests.
//! - **Mock uploads** ([`mock_upload`], [`mock_uploads`]): buffers whose
//!   contents are `"WxH"` text understood by
//!   [`MockCodec`](crate::imaging::backend::tests::MockCodec).
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let real = png_bytes(200, 100);
//! let fake = mock_uploads(&["a.png", "b.png"], "800x1600");
//! ```

use crate::upload::{UploadedImage, mime_for_name};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Real image buffers
// =========================================================================

/// RGB gradient: red rises left to right, green top to bottom.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

fn encode(image: impl Into<image::DynamicImage>, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.into().write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height), ImageFormat::Jpeg)
}

/// PNG with an alpha channel (half-transparent everywhere).
pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 0, 128])
    });
    encode(image, ImageFormat::Png)
}

// =========================================================================
// Mock uploads
// =========================================================================

/// Upload whose bytes are `contents`, MIME type from the file name.
pub fn mock_upload(name: &str, contents: &str) -> UploadedImage {
    UploadedImage::new(name, mime_for_name(name), contents.as_bytes().to_vec())
}

/// One mock upload per name, all with the same contents.
pub fn mock_uploads(names: &[&str], contents: &str) -> Vec<UploadedImage> {
    names.iter().map(|n| mock_upload(n, contents)).collect()
}
