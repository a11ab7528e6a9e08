//! Parameter types for encode operations.
//!
//! - [`Quality`]: lossy encoding quality (1-100, default 90), clamped on construction.
//! - [`FormatHint`]: output encoding requested by an upload's MIME type.

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Which encoding an upload would like its crop written in.
///
/// Only PNG and JPEG are honoured; anything else encodes as PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    Png,
    Jpeg,
    Unknown,
}

impl FormatHint {
    /// Derive a hint from a MIME type such as `image/png` or `image/jpeg`.
    ///
    /// Case-insensitive; parameters after `;` are ignored.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/png" | "image/x-png" => FormatHint::Png,
            "image/jpeg" | "image/jpg" | "image/pjpeg" => FormatHint::Jpeg,
            _ => FormatHint::Unknown,
        }
    }

    /// Label used in logs and the results report.
    pub fn label(self) -> &'static str {
        match self {
            FormatHint::Png => "png",
            FormatHint::Jpeg => "jpeg",
            FormatHint::Unknown => "png (fallback)",
        }
    }
}
