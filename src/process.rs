//! Batch cropping.
//!
//! Applies one [`CropRegion`] to every uploaded image and produces one
//! [`CropResult`] per input, in input order.
//!
//! ## Run Lifecycle
//!
//! ```text
//! Idle ──select_region──▶ RegionSelected ──run──▶ Running ──▶ Completed
//!                               ▲                                 │
//!                               └──────────select_region──────────┘
//! ```
//!
//! The region is taken when a run starts and discarded when it completes;
//! the next run needs a fresh selection.
//!
//! ## Per-Item Steps
//!
//! For the image at 0-based index `i` of `count`:
//!
//! 1. Skip as [`ItemError::Cancelled`] if the cancel token is set
//! 2. Decode (failure → [`CropResult::Failure`], batch continues)
//! 3. Resolve the region against this image's own dimensions
//! 4. Zero-area result → [`ItemError::EmptyCrop`]
//! 5. Crop + encode, format hint from the upload's MIME type
//! 6. Name the output `NNN_<name>` (see [`naming`](crate::naming))
//! 7. Report progress, success or failure
//!
//! ## Parallel Processing
//!
//! Items have no data dependency on each other, only on the shared read-only
//! region, so they run on the [rayon](https://docs.rs/rayon) pool. Results are
//! collected by index, so output order never depends on completion order.

use crate::geometry::{CropRegion, GeometryError, Selection};
use crate::imaging::{CodecError, FormatHint, ImageCodec, ItemError, crop_image};
use crate::naming;
use crate::upload::UploadedImage;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("No images to process")]
    NoImages,
    #[error("No crop region selected")]
    NoRegion,
    #[error(transparent)]
    InvalidRegion(#[from] GeometryError),
    #[error("Cannot read reference image {name}: {source}")]
    Reference {
        name: String,
        #[source]
        source: CodecError,
    },
}

/// Outcome for one uploaded image.
#[derive(Debug, Clone, PartialEq)]
pub enum CropResult {
    Success {
        original_name: String,
        output_name: String,
        bytes: Vec<u8>,
        /// Cropped output dimensions.
        width: u32,
        height: u32,
    },
    Failure {
        original_name: String,
        reason: ItemError,
    },
}

impl CropResult {
    pub fn original_name(&self) -> &str {
        match self {
            CropResult::Success { original_name, .. } | CropResult::Failure { original_name, .. } => {
                original_name
            }
        }
    }

    pub fn output_name(&self) -> Option<&str> {
        match self {
            CropResult::Success { output_name, .. } => Some(output_name),
            CropResult::Failure { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CropResult::Success { .. })
    }
}

/// A skipped image and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedItem {
    pub name: String,
    pub reason: ItemError,
}

/// Processed-vs-skipped counts for a finished batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub skipped: Vec<SkippedItem>,
}

impl BatchSummary {
    pub fn from_results(results: &[CropResult]) -> Self {
        let skipped: Vec<SkippedItem> = results
            .iter()
            .filter_map(|r| match r {
                CropResult::Failure {
                    original_name,
                    reason,
                } => Some(SkippedItem {
                    name: original_name.clone(),
                    reason: reason.clone(),
                }),
                CropResult::Success { .. } => None,
            })
            .collect();
        Self {
            total: results.len(),
            processed: results.len() - skipped.len(),
            skipped,
        }
    }

    /// Whether there is anything worth archiving.
    pub fn has_output(&self) -> bool {
        self.processed > 0
    }
}

/// What happened to one item, as carried by [`ProcessEvent::ItemFinished`].
#[derive(Debug, Clone, PartialEq)]
pub enum ItemStatus {
    Cropped {
        output_name: String,
        width: u32,
        height: u32,
    },
    Skipped {
        reason: ItemError,
    },
}

/// Progress events emitted during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    BatchStarted {
        total: usize,
    },
    /// One per item. `completed` counts finished items including this one.
    ItemFinished {
        index: usize,
        name: String,
        status: ItemStatus,
        completed: usize,
        total: usize,
    },
}

impl ProcessEvent {
    /// Fraction of the batch finished, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        match self {
            ProcessEvent::BatchStarted { .. } => 0.0,
            ProcessEvent::ItemFinished {
                completed, total, ..
            } => {
                if *total == 0 {
                    1.0
                } else {
                    *completed as f64 / *total as f64
                }
            }
        }
    }
}

/// Receives progress events. Called from worker threads.
pub trait ProgressReporter: Sync {
    fn report(&self, event: ProcessEvent);
}

/// Reporter that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProcessEvent) {}
}

impl ProgressReporter for Sender<ProcessEvent> {
    fn report(&self, event: ProcessEvent) {
        // A dropped receiver only means nobody is listening any more.
        let _ = self.send(event);
    }
}

/// Shared flag checked before each item starts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Run options.
#[derive(Debug, Clone, Copy)]
pub struct ProcessOptions {
    /// Process items on the rayon pool instead of the calling thread.
    pub parallel: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    RegionSelected,
    Running,
    Completed,
}

/// Turn the user's selection into the region a run applies.
///
/// Rectangle selections are measured against `reference` (header read only);
/// fixed-offset selections need no reference.
pub fn resolve_region(
    codec: &impl ImageCodec,
    selection: Selection,
    reference: Option<&UploadedImage>,
) -> Result<CropRegion, ProcessError> {
    match selection {
        Selection::FixedOffset { .. } => Ok(selection.into_crop_region(None)?),
        Selection::Rectangle(_) => {
            let reference = reference.ok_or(ProcessError::NoImages)?;
            let dims = codec
                .identify(&reference.bytes)
                .map_err(|source| ProcessError::Reference {
                    name: reference.name.clone(),
                    source,
                })?;
            debug!(
                reference = %reference.name,
                width = dims.width,
                height = dims.height,
                "measured reference image"
            );
            Ok(selection.into_crop_region(Some((dims.width, dims.height)))?)
        }
    }
}

/// Applies one region to a batch of uploads.
pub struct BatchCropProcessor<'a, C: ImageCodec> {
    codec: &'a C,
    options: ProcessOptions,
    state: BatchState,
    region: Option<CropRegion>,
}

impl<'a, C: ImageCodec> BatchCropProcessor<'a, C> {
    pub fn new(codec: &'a C) -> Self {
        Self::with_options(codec, ProcessOptions::default())
    }

    pub fn with_options(codec: &'a C, options: ProcessOptions) -> Self {
        Self {
            codec,
            options,
            state: BatchState::Idle,
            region: None,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn region(&self) -> Option<&CropRegion> {
        self.region.as_ref()
    }

    /// Finalize the selection for the next run, replacing any earlier one.
    pub fn select_region(&mut self, region: impl Into<CropRegion>) {
        self.region = Some(region.into());
        self.state = BatchState::RegionSelected;
    }

    /// Crop every image. Returns exactly one result per input, in input order.
    ///
    /// Fails before touching any image if no region is selected or `images`
    /// is empty; per-image problems never fail the run.
    pub fn run(
        &mut self,
        images: &[UploadedImage],
        reporter: &dyn ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<Vec<CropResult>, ProcessError> {
        if self.region.is_none() {
            return Err(ProcessError::NoRegion);
        }
        if images.is_empty() {
            return Err(ProcessError::NoImages);
        }
        let region = self.region.take().ok_or(ProcessError::NoRegion)?;
        self.state = BatchState::Running;

        let total = images.len();
        info!(total, %region, parallel = self.options.parallel, "starting batch");
        reporter.report(ProcessEvent::BatchStarted { total });

        let completed = Mutex::new(0usize);
        let codec = self.codec;
        let step = |index: usize, image: &UploadedImage| -> CropResult {
            let result = process_item(codec, index, total, image, &region, cancel);
            // Count and report under one lock so events arrive in order.
            let mut done = completed.lock().unwrap_or_else(PoisonError::into_inner);
            *done += 1;
            reporter.report(ProcessEvent::ItemFinished {
                index,
                name: image.name.clone(),
                status: item_status(&result),
                completed: *done,
                total,
            });
            result
        };

        let results: Vec<CropResult> = if self.options.parallel {
            images
                .par_iter()
                .enumerate()
                .map(|(index, image)| step(index, image))
                .collect()
        } else {
            images
                .iter()
                .enumerate()
                .map(|(index, image)| step(index, image))
                .collect()
        };

        let summary = BatchSummary::from_results(&results);
        info!(
            processed = summary.processed,
            skipped = summary.skipped.len(),
            cancelled = cancel.is_cancelled(),
            "batch finished"
        );
        self.state = BatchState::Completed;
        Ok(results)
    }
}

fn item_status(result: &CropResult) -> ItemStatus {
    match result {
        CropResult::Success {
            output_name,
            width,
            height,
            ..
        } => ItemStatus::Cropped {
            output_name: output_name.clone(),
            width: *width,
            height: *height,
        },
        CropResult::Failure { reason, .. } => ItemStatus::Skipped {
            reason: reason.clone(),
        },
    }
}

/// Process one image. Never fails: errors become [`CropResult::Failure`].
fn process_item(
    codec: &impl ImageCodec,
    index: usize,
    total: usize,
    image: &UploadedImage,
    region: &CropRegion,
    cancel: &CancelToken,
) -> CropResult {
    if cancel.is_cancelled() {
        return CropResult::Failure {
            original_name: image.name.clone(),
            reason: ItemError::Cancelled,
        };
    }

    let hint = FormatHint::from_mime(&image.mime_type);
    match crop_image(codec, &image.bytes, region, hint) {
        Ok(crop) => {
            let output_name = naming::output_name(index, total, &image.name);
            debug!(
                index,
                name = %image.name,
                output = %output_name,
                source_width = crop.source.width,
                source_height = crop.source.height,
                rect = %crop.rect,
                format = hint.label(),
                "cropped"
            );
            CropResult::Success {
                original_name: image.name.clone(),
                output_name,
                bytes: crop.bytes,
                width: crop.rect.width(),
                height: crop.rect.height(),
            }
        }
        Err(reason) => {
            warn!(index, name = %image.name, %reason, "skipping image");
            CropResult::Failure {
                original_name: image.name.clone(),
                reason,
            }
        }
    }
}
