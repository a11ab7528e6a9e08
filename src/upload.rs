//! Input collection: turns command-line paths into uploaded images.
//!
//! Plays the part of an upload widget. Each input path is either:
//!
//! - a **file**, taken as-is whatever its extension (a file that is not PNG or
//!   JPEG becomes a per-item failure later, not an error here), or
//! - a **directory**, scanned one level deep for `.png`, `.jpg` and `.jpeg`
//!   files, sorted by file name.
//!
//! Inputs keep the order they were given on the command line; that order is
//! the batch order and decides the `NNN_` output prefixes.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
}

/// Extensions picked up when scanning a directory.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// One uploaded image. Read-only to the crop pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// File name as uploaded (no directory part).
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// MIME type for a file name, from its extension.
pub fn mime_for_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| e.eq_ignore_ascii_case(known))
        })
}

/// Read one file into an [`UploadedImage`].
pub fn load_file(path: &Path) -> Result<UploadedImage, UploadError> {
    let bytes = fs::read(path).map_err(|source| UploadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = mime_for_name(&name);
    Ok(UploadedImage::new(name, mime_type, bytes))
}

/// Image files directly inside `dir`, sorted by file name.
fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>, UploadError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() && has_image_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Collect uploads from files and directories, in the given order.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<UploadedImage>, UploadError> {
    let mut images = Vec::new();
    for path in paths {
        if path.is_dir() {
            let files = scan_directory(path)?;
            tracing::debug!(dir = %path.display(), count = files.len(), "scanned input directory");
            for file in files {
                images.push(load_file(&file)?);
            }
        } else if path.is_file() {
            images.push(load_file(path)?);
        } else {
            return Err(UploadError::NotFound(path.clone()));
        }
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for_name("a.png"), "image/png");
        assert_eq!(mime_for_name("a.JPG"), "image/jpeg");
        assert_eq!(mime_for_name("a.jpeg"), "image/jpeg");
        assert_eq!(mime_for_name("a.webp"), "application/octet-stream");
        assert_eq!(mime_for_name("noext"), "application/octet-stream");
    }

    #[test]
    fn load_file_keeps_name_and_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = touch(tmp.path(), "shot.png", b"abc");

        let image = load_file(&path).unwrap();
        assert_eq!(image.name, "shot.png");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, b"abc");
    }

    #[test]
    fn directory_scan_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b.jpg", b"b");
        touch(tmp.path(), "a.png", b"a");
        touch(tmp.path(), "notes.txt", b"n");
        touch(tmp.path(), "c.JPEG", b"c");
        fs::create_dir(tmp.path().join("nested")).unwrap();
        touch(&tmp.path().join("nested"), "d.png", b"d");

        let images = collect_inputs(&[tmp.path().to_path_buf()]).unwrap();
        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.jpg", "c.JPEG"]);
    }

    #[test]
    fn explicit_files_keep_argument_order() {
        let tmp = TempDir::new().unwrap();
        let second = touch(tmp.path(), "z.png", b"z");
        let first = touch(tmp.path(), "a.gif", b"a");

        let images = collect_inputs(&[second, first]).unwrap();
        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["z.png", "a.gif"]);
        assert_eq!(images[1].mime_type, "application/octet-stream");
    }

    #[test]
    fn missing_input_errors() {
        let tmp = TempDir::new().unwrap();
        let result = collect_inputs(&[tmp.path().join("missing.png")]);
        assert!(matches!(result, Err(UploadError::NotFound(_))));
    }

    #[test]
    fn empty_directory_yields_no_images() {
        let tmp = TempDir::new().unwrap();
        let images = collect_inputs(&[tmp.path().to_path_buf()]).unwrap();
        assert!(images.is_empty());
    }
}
