//! Image processing in pure Rust, entirely in memory.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Decode** | `image` PNG + JPEG decoders |
//! | **Crop** | `DynamicImage::crop_imm` |
//! | **Encode** | PNG, or JPEG at a configured [`Quality`] |
//!
//! The module is split into:
//! - **Parameters**: [`Quality`] and [`FormatHint`]
//! - **Backend**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Operations**: High-level functions combining crop geometry + codec

pub mod backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{CodecError, DecodedRaster, Dimensions, ImageCodec};
pub use operations::{EncodedCrop, ItemError, crop_image, get_dimensions, plan_crop};
pub use params::{FormatHint, Quality};
pub use rust_backend::RustCodec;
