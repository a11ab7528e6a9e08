//! Output filename convention: `NNN_<original name>`.
//!
//! Every cropped image is stored under its 1-based position in the batch,
//! zero-padded, followed by an underscore and the uploaded file name:
//!
//! - `001_photo.png`, `002_IMG_0042.jpg`, ... for batches up to 999 images
//! - `0001_photo.png`, ... once the batch reaches 1000 images
//!
//! The pad width is fixed per batch, so lexical order of the names always
//! matches input order and two positions never share a prefix.

/// Minimum number of digits in the position prefix.
pub const MIN_PAD_WIDTH: usize = 3;

/// Digits needed to write every position of a `count`-item batch.
///
/// `max(3, ceil(log10(count + 1)))`, i.e. the digit count of `count`.
pub fn pad_width(count: usize) -> usize {
    let digits = count.checked_ilog10().map_or(1, |d| d as usize + 1);
    digits.max(MIN_PAD_WIDTH)
}

/// Archive name for the image at 0-based `index` of a `count`-item batch.
pub fn output_name(index: usize, count: usize, original_name: &str) -> String {
    format!(
        "{:0width$}_{}",
        index + 1,
        original_name,
        width = pad_width(count)
    )
}
