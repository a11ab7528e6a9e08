//! # shotcrop
//!
//! Batch-crops screenshots. One crop region, chosen once on a reference
//! image, is applied to every image in the batch; the results are packaged
//! into a single zip archive.
//!
//! # Pipeline
//!
//! ```text
//! inputs ─▶ upload ─▶ select region ─▶ process (per image) ─▶ archive ─▶ .zip
//!                      │                 decode → crop → encode
//!                      └─ normalized against the reference image
//! ```
//!
//! A rectangle drawn on the reference image is stored as ratios of that
//! image's width and height, so it lands in the same relative place on
//! screenshots of a different resolution. The fixed-offset mode (shave N
//! pixels off the top) is applied in each image's own pixel space.
//!
//! A bad image never sinks the batch: it becomes a `Failure` with a reason
//! and every other image is still cropped.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Rectangles, normalized regions, normalize / denormalize |
//! | [`imaging`] | `ImageCodec` trait, `image`-crate codec, single-image crop |
//! | [`process`] | Batch run: ordering, naming, failure isolation, progress, cancellation |
//! | [`naming`] | `NNN_<name>` output file names |
//! | [`archive`] | Zip packaging of successful results |
//! | [`upload`] | Files and directories → in-memory uploads |
//! | [`config`] | `shotcrop.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting and the JSON report |
//!
//! # Design Decisions
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and encoding use the `image` crate with only the PNG and JPEG
//! codecs compiled in. There is no system library to install.
//!
//! ## Parallel Items, Ordered Results
//!
//! Items run on a rayon pool sized from `[processing] max_processes`. Results
//! are collected by index, so the archive and the report always follow input
//! order regardless of which worker finishes first.

pub mod archive;
pub mod config;
pub mod geometry;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
