//! Zip packaging of a finished batch.
//!
//! The archive is built in memory. Entry names must be unique within one
//! archive; the `NNN_` prefixes from [`naming`](crate::naming) guarantee that
//! for batch output, so a duplicate here is a bug upstream and fails loudly.

use crate::process::{CropResult, SkippedItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use thiserror::Error;
use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Archive write failed: {0}")]
    Write(String),
    #[error("Duplicate archive entry: {0}")]
    DuplicateEntry(String),
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiveError::Write(err.to_string())
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        ArchiveError::Write(err.to_string())
    }
}

/// Entry compression. PNG and JPEG are already compressed, so `Stored`
/// trades a slightly larger archive for less CPU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        }
    }
}

/// One named file inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: usize,
}

/// Accumulates named byte buffers into a zip archive.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    compression: Compression,
    names: HashSet<String>,
    entries: Vec<ArchiveEntry>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::with_compression(Compression::default())
    }

    pub fn with_compression(compression: Compression) -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            compression,
            names: HashSet::new(),
            entries: Vec::new(),
        }
    }

    /// Add one file. Names must be unique.
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<(), ArchiveError> {
        if !self.names.insert(name.to_string()) {
            return Err(ArchiveError::DuplicateEntry(name.to_string()));
        }
        let options = SimpleFileOptions::default().compression_method(self.compression.method());
        self.writer.start_file(name, options)?;
        self.writer.write_all(bytes)?;
        debug!(entry = name, bytes = bytes.len(), "archived");
        self.entries.push(ArchiveEntry {
            name: name.to_string(),
            size: bytes.len(),
        });
        Ok(())
    }

    /// Entries added so far, in insertion order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Finalize and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>, ArchiveError> {
        Ok(self.writer.finish()?.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A finished archive plus the items that were left out of it.
#[derive(Debug, Clone)]
pub struct Archive {
    pub bytes: Vec<u8>,
    pub entries: Vec<ArchiveEntry>,
    pub skipped: Vec<SkippedItem>,
}

/// Package every successful result under its output name.
pub fn build(results: &[CropResult], compression: Compression) -> Result<Archive, ArchiveError> {
    let mut builder = ArchiveBuilder::with_compression(compression);
    let mut skipped = Vec::new();
    for result in results {
        match result {
            CropResult::Success {
                output_name, bytes, ..
            } => builder.add(output_name, bytes)?,
            CropResult::Failure {
                original_name,
                reason,
            } => skipped.push(SkippedItem {
                name: original_name.clone(),
                reason: reason.clone(),
            }),
        }
    }
    let entries = builder.entries().to_vec();
    let bytes = builder.finish()?;
    Ok(Archive {
        bytes,
        entries,
        skipped,
    })
}
