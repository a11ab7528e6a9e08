//! Crop geometry: pixel rectangles, ratio regions, and the mapping between them.
//!
//! A selection is made once, on a reference image, in that image's pixel
//! space. Screenshots in one batch often differ slightly in resolution, so the
//! selection is stored as ratios of the reference dimensions and re-applied to
//! each image in its own pixel space.
//!
//! ```text
//! reference 1000x2000, rect (0,160,1000,2000)
//!     normalize   → {0.0, 0.08, 1.0, 1.0}
//!     denormalize → 800x1600 target: (0,128,800,1600)
//! ```
//!
//! ## Selection Modes
//!
//! | Mode | Input | Applied as |
//! |---|---|---|
//! | Rectangle | `(left, top, right, bottom)` on the reference | [`CropRegion::Proportional`] |
//! | Fixed offset | `cut_height` pixels shaved off the top | [`CropRegion::TopOffset`] |
//!
//! Both modes go through [`Selection`]; there is no separate code path per mode.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Invalid region: {0}")]
    InvalidRegion(String),
}

/// A pixel rectangle in one image's coordinate space.
///
/// `right` and `bottom` are exclusive. A rectangle with `left >= right` or
/// `top >= bottom` is empty and describes no pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Rectangle {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Rectangle {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The full-image rectangle for the given dimensions.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Zero-area rectangle anchored at `(left, top)`.
    pub fn empty_at(left: u32, top: u32) -> Self {
        Self::new(left, top, left, top)
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// True when the rectangle is non-empty and lies inside `width` x `height`.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.left < self.right
            && self.right <= width
            && self.top < self.bottom
            && self.bottom <= height
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{},{},{})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

impl FromStr for Rectangle {
    type Err = GeometryError;

    /// Parse `"left,top,right,bottom"`, e.g. `"0,160,1000,2000"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(GeometryError::InvalidRegion(format!(
                "expected LEFT,TOP,RIGHT,BOTTOM, got '{s}'"
            )));
        }
        let mut coords = [0u32; 4];
        for (slot, part) in coords.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                GeometryError::InvalidRegion(format!("'{part}' is not a pixel coordinate"))
            })?;
        }
        let [left, top, right, bottom] = coords;
        Ok(Self::new(left, top, right, bottom))
    }
}

/// A crop region expressed as fractions of image width and height.
///
/// All four ratios are finite, within `[0, 1]`, and strictly ordered
/// (`left < right`, `top < bottom`). Constructed only through [`new`](Self::new)
/// or [`normalize`], so the invariant holds for every value.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct NormalizedRegion {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl NormalizedRegion {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Result<Self, GeometryError> {
        let ratios = [left, top, right, bottom];
        if ratios.iter().any(|r| !r.is_finite() || !(0.0..=1.0).contains(r)) {
            return Err(GeometryError::InvalidRegion(format!(
                "ratios must be within [0, 1], got {{{left}, {top}, {right}, {bottom}}}"
            )));
        }
        if left >= right || top >= bottom {
            return Err(GeometryError::InvalidRegion(format!(
                "ratios must be ordered (left < right, top < bottom), got {{{left}, {top}, {right}, {bottom}}}"
            )));
        }
        Ok(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    /// The whole image.
    pub fn full() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            right: 1.0,
            bottom: 1.0,
        }
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }
}

impl fmt::Display for NormalizedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{:.4}, {:.4}, {:.4}, {:.4}}}",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Convert a rectangle measured on a reference image into ratios.
///
/// Fails if the reference has a zero dimension or the rectangle is empty or
/// extends past the reference bounds.
pub fn normalize(
    rect: Rectangle,
    ref_width: u32,
    ref_height: u32,
) -> Result<NormalizedRegion, GeometryError> {
    if ref_width == 0 || ref_height == 0 {
        return Err(GeometryError::InvalidRegion(format!(
            "reference dimensions must be positive, got {ref_width}x{ref_height}"
        )));
    }
    if !rect.fits_within(ref_width, ref_height) {
        return Err(GeometryError::InvalidRegion(format!(
            "rectangle {rect} does not fit a {ref_width}x{ref_height} reference"
        )));
    }
    let w = ref_width as f64;
    let h = ref_height as f64;
    NormalizedRegion::new(
        rect.left as f64 / w,
        rect.top as f64 / h,
        rect.right as f64 / w,
        rect.bottom as f64 / h,
    )
}

/// Map ratios back onto a `target_width` x `target_height` image.
///
/// Each edge is rounded, then clamped into the target bounds independently.
/// If rounding and clamping leave no pixels (a very small region on a very
/// small image), the result is an empty rectangle rather than an error.
pub fn denormalize(region: &NormalizedRegion, target_width: u32, target_height: u32) -> Rectangle {
    let scale = |ratio: f64, extent: u32| -> u32 {
        (ratio * extent as f64).round().clamp(0.0, extent as f64) as u32
    };

    let left = scale(region.left, target_width);
    let top = scale(region.top, target_height);
    let right = scale(region.right, target_width);
    let bottom = scale(region.bottom, target_height);

    if left >= right || top >= bottom {
        return Rectangle::empty_at(left, top);
    }
    Rectangle::new(left, top, right, bottom)
}

/// What the user selected, before it is applied to any image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Shave `cut_height` pixels off the top, keep full width.
    FixedOffset { cut_height: u32 },
    /// Explicit rectangle in the reference image's pixel space.
    Rectangle(Rectangle),
}

impl Selection {
    /// The selection as a pixel rectangle on an image of the given size.
    ///
    /// Fixed-offset selections collapse to an empty rectangle when
    /// `cut_height >= height`.
    pub fn rectangle_on(&self, width: u32, height: u32) -> Rectangle {
        match *self {
            Selection::FixedOffset { cut_height } => {
                if cut_height >= height {
                    Rectangle::empty_at(0, height)
                } else {
                    Rectangle::new(0, cut_height, width, height)
                }
            }
            Selection::Rectangle(rect) => rect,
        }
    }

    /// Normalize against the reference image dimensions.
    ///
    /// Fixed offset is the degenerate case `{0, cut_height / ref_height, 1, 1}`.
    pub fn normalize(
        &self,
        ref_width: u32,
        ref_height: u32,
    ) -> Result<NormalizedRegion, GeometryError> {
        normalize(self.rectangle_on(ref_width, ref_height), ref_width, ref_height)
    }

    /// Turn the selection into the region a batch run applies.
    ///
    /// Rectangle selections need the reference dimensions; fixed-offset
    /// selections are applied in each image's own pixel space and ignore them.
    pub fn into_crop_region(
        self,
        reference: Option<(u32, u32)>,
    ) -> Result<CropRegion, GeometryError> {
        match self {
            Selection::FixedOffset { cut_height } => Ok(CropRegion::TopOffset { cut_height }),
            Selection::Rectangle(_) => {
                let (w, h) = reference.ok_or_else(|| {
                    GeometryError::InvalidRegion(
                        "rectangle selection requires a reference image".to_string(),
                    )
                })?;
                Ok(CropRegion::Proportional(self.normalize(w, h)?))
            }
        }
    }
}

/// The region a batch run applies to every image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropRegion {
    Proportional(NormalizedRegion),
    TopOffset { cut_height: u32 },
}

impl CropRegion {
    /// Resolve against one image's own dimensions. May return an empty rectangle.
    pub fn rect_for(&self, width: u32, height: u32) -> Rectangle {
        match self {
            CropRegion::Proportional(region) => denormalize(region, width, height),
            CropRegion::TopOffset { cut_height } => Selection::FixedOffset {
                cut_height: *cut_height,
            }
            .rectangle_on(width, height),
        }
    }
}

impl From<NormalizedRegion> for CropRegion {
    fn from(region: NormalizedRegion) -> Self {
        CropRegion::Proportional(region)
    }
}

impl fmt::Display for CropRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropRegion::Proportional(region) => write!(f, "proportional {region}"),
            CropRegion::TopOffset { cut_height } => write!(f, "top offset {cut_height}px"),
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
