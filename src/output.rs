//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Crop
//!
//! ```text
//! Cropping 3 images
//! [ 33%] 001 a.png → 001_a.png (800x1472)
//! [ 67%] 002 b.png skipped: corrupt image: Format error decoding Png
//! [100%] 003 c.jpg → 003_c.jpg (1000x1840)
//!
//! Processed 2 of 3 images
//! Skipped 1:
//!     b.png: corrupt image: Format error decoding Png
//! Archive: cleaned_screenshots.zip (2 files)
//! ```
//!
//! ## Region
//!
//! ```text
//! Region: proportional {0.0000, 0.0800, 1.0000, 1.0000}
//! 001 a.png 1000x2000 → (0,160,1000,2000) 1000x1840
//! 002 b.png 800x1600 → (0,128,800,1600) 800x1472
//! 003 c.png: corrupt image: ...
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::geometry::CropRegion;
use crate::imaging::{CodecError, Dimensions, plan_crop};
use crate::process::{BatchSummary, CropResult, ItemStatus, ProcessEvent};
use serde::Serialize;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn format_percent(fraction: f64) -> String {
    format!("[{:>3}%]", (fraction * 100.0).round() as u32)
}

// ============================================================================
// Crop run
// ============================================================================

/// Format one progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted { total } => {
            let noun = if *total == 1 { "image" } else { "images" };
            vec![format!("Cropping {} {}", total, noun)]
        }
        ProcessEvent::ItemFinished {
            index, name, status, ..
        } => {
            let prefix = format!(
                "{} {} {}",
                format_percent(event.fraction()),
                format_index(index + 1),
                name
            );
            let line = match status {
                ItemStatus::Cropped {
                    output_name,
                    width,
                    height,
                } => format!("{} → {} ({}x{})", prefix, output_name, width, height),
                ItemStatus::Skipped { reason } => format!("{} skipped: {}", prefix, reason),
            };
            vec![line]
        }
    }
}

/// Format the end-of-run summary.
///
/// `archive` is the written archive path and entry count, `None` when nothing
/// was written.
pub fn format_summary(summary: &BatchSummary, archive: Option<(&Path, usize)>) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!(
            "Processed {} of {} images",
            summary.processed, summary.total
        ),
    ];
    if !summary.skipped.is_empty() {
        lines.push(format!("Skipped {}:", summary.skipped.len()));
        for item in &summary.skipped {
            lines.push(format!("    {}: {}", item.name, item.reason));
        }
    }
    match archive {
        Some((path, count)) => {
            let noun = if count == 1 { "file" } else { "files" };
            lines.push(format!("Archive: {} ({} {})", path.display(), count, noun));
        }
        None => lines.push("No images cropped; archive not written".to_string()),
    }
    lines
}

pub fn print_summary(summary: &BatchSummary, archive: Option<(&Path, usize)>) {
    for line in format_summary(summary, archive) {
        println!("{}", line);
    }
}

// ============================================================================
// Region preview
// ============================================================================

/// Format the region and the rectangle it maps to on each input.
pub fn format_region_preview(
    region: &CropRegion,
    items: &[(String, Result<Dimensions, CodecError>)],
) -> Vec<String> {
    let mut lines = vec![format!("Region: {}", region)];
    for (i, (name, dims)) in items.iter().enumerate() {
        let line = match dims {
            Ok(d) => match plan_crop(region, d.width, d.height) {
                Some(rect) => format!(
                    "{} {} {}x{} → {} {}x{}",
                    format_index(i + 1),
                    name,
                    d.width,
                    d.height,
                    rect,
                    rect.width(),
                    rect.height()
                ),
                None => format!(
                    "{} {} {}x{} → empty crop",
                    format_index(i + 1),
                    name,
                    d.width,
                    d.height
                ),
            },
            Err(err) => format!("{} {}: {}", format_index(i + 1), name, err),
        };
        lines.push(line);
    }
    lines
}

pub fn print_region_preview(region: &CropRegion, items: &[(String, Result<Dimensions, CodecError>)]) {
    for line in format_region_preview(region, items) {
        println!("{}", line);
    }
}

// ============================================================================
// JSON report
// ============================================================================

/// One row of the `--report` file.
#[derive(Debug, Serialize)]
pub struct ResultRecord<'a> {
    /// 1-based batch position.
    pub index: usize,
    pub original_name: &'a str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn result_record(index: usize, result: &CropResult) -> ResultRecord<'_> {
    match result {
        CropResult::Success {
            original_name,
            output_name,
            width,
            height,
            ..
        } => ResultRecord {
            index: index + 1,
            original_name,
            status: "cropped",
            output_name: Some(output_name.as_str()),
            width: Some(*width),
            height: Some(*height),
            reason: None,
        },
        CropResult::Failure {
            original_name,
            reason,
        } => ResultRecord {
            index: index + 1,
            original_name,
            status: "skipped",
            output_name: None,
            width: None,
            height: None,
            reason: Some(reason.to_string()),
        },
    }
}

/// Pretty-printed JSON array of per-item results, in batch order.
pub fn format_results_json(results: &[CropResult]) -> Result<String, serde_json::Error> {
    let records: Vec<ResultRecord<'_>> = results
        .iter()
        .enumerate()
        .map(|(i, r)| result_record(i, r))
        .collect();
    serde_json::to_string_pretty(&records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{NormalizedRegion, Rectangle, normalize};
    use crate::imaging::ItemError;
    use crate::process::SkippedItem;

    fn cropped(index: usize, completed: usize, total: usize) -> ProcessEvent {
        ProcessEvent::ItemFinished {
            index,
            name: "a.png".to_string(),
            status: ItemStatus::Cropped {
                output_name: "002_a.png".to_string(),
                width: 800,
                height: 1472,
            },
            completed,
            total,
        }
    }

    // =========================================================================
    // Progress events
    // =========================================================================

    #[test]
    fn batch_started_line() {
        let lines = format_process_event(&ProcessEvent::BatchStarted { total: 5 });
        assert_eq!(lines, vec!["Cropping 5 images"]);
        let lines = format_process_event(&ProcessEvent::BatchStarted { total: 1 });
        assert_eq!(lines, vec!["Cropping 1 image"]);
    }

    #[test]
    fn cropped_item_line() {
        let lines = format_process_event(&cropped(1, 2, 5));
        assert_eq!(lines, vec!["[ 40%] 002 a.png → 002_a.png (800x1472)"]);
    }

    #[test]
    fn final_item_shows_full_progress() {
        let lines = format_process_event(&cropped(1, 5, 5));
        assert!(lines[0].starts_with("[100%]"));
    }

    #[test]
    fn skipped_item_line() {
        let event = ProcessEvent::ItemFinished {
            index: 2,
            name: "bad.png".to_string(),
            status: ItemStatus::Skipped {
                reason: ItemError::EmptyCrop,
            },
            completed: 3,
            total: 3,
        };
        let lines = format_process_event(&event);
        assert_eq!(
            lines,
            vec!["[100%] 003 bad.png skipped: region collapses to empty crop"]
        );
    }

    // =========================================================================
    // Summary
    // =========================================================================

    #[test]
    fn summary_lists_skipped_and_archive() {
        let summary = BatchSummary {
            total: 3,
            processed: 2,
            skipped: vec![SkippedItem {
                name: "b.png".to_string(),
                reason: ItemError::CorruptImage("truncated".to_string()),
            }],
        };
        let lines = format_summary(&summary, Some((Path::new("out.zip"), 2)));
        assert_eq!(lines[1], "Processed 2 of 3 images");
        assert_eq!(lines[2], "Skipped 1:");
        assert_eq!(lines[3], "    b.png: corrupt image: truncated");
        assert_eq!(lines[4], "Archive: out.zip (2 files)");
    }

    #[test]
    fn summary_without_archive() {
        let summary = BatchSummary {
            total: 1,
            processed: 0,
            skipped: vec![SkippedItem {
                name: "x.gif".to_string(),
                reason: ItemError::UnsupportedFormat("gif".to_string()),
            }],
        };
        let lines = format_summary(&summary, None);
        assert_eq!(
            lines.last().map(String::as_str),
            Some("No images cropped; archive not written")
        );
    }

    // =========================================================================
    // Region preview
    // =========================================================================

    #[test]
    fn region_preview_maps_each_image() {
        let region: CropRegion = normalize(Rectangle::new(0, 160, 1000, 2000), 1000, 2000)
            .unwrap()
            .into();
        let items = vec![
            (
                "a.png".to_string(),
                Ok(Dimensions {
                    width: 1000,
                    height: 2000,
                }),
            ),
            (
                "b.png".to_string(),
                Ok(Dimensions {
                    width: 800,
                    height: 1600,
                }),
            ),
            (
                "c.png".to_string(),
                Err(CodecError::CorruptImage("bad".to_string())),
            ),
        ];
        let lines = format_region_preview(&region, &items);
        assert!(lines[0].starts_with("Region: proportional"));
        assert_eq!(lines[1], "001 a.png 1000x2000 → (0,160,1000,2000) 1000x1840");
        assert_eq!(lines[2], "002 b.png 800x1600 → (0,128,800,1600) 800x1472");
        assert_eq!(lines[3], "003 c.png: corrupt image: bad");
    }

    #[test]
    fn region_preview_flags_empty_crop() {
        let region = CropRegion::TopOffset { cut_height: 130 };
        let items = vec![(
            "tiny.png".to_string(),
            Ok(Dimensions {
                width: 50,
                height: 100,
            }),
        )];
        let lines = format_region_preview(&region, &items);
        assert_eq!(lines[1], "001 tiny.png 50x100 → empty crop");
    }

    // =========================================================================
    // JSON report
    // =========================================================================

    #[test]
    fn results_json_has_one_record_per_item() {
        let results = vec![
            CropResult::Success {
                original_name: "a.png".to_string(),
                output_name: "001_a.png".to_string(),
                bytes: vec![1, 2, 3],
                width: 10,
                height: 20,
            },
            CropResult::Failure {
                original_name: "b.png".to_string(),
                reason: ItemError::Cancelled,
            },
        ];
        let json = format_results_json(&results).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = value.as_array().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["index"], 1);
        assert_eq!(rows[0]["status"], "cropped");
        assert_eq!(rows[0]["output_name"], "001_a.png");
        assert_eq!(rows[0]["height"], 20);
        assert!(rows[0].get("reason").is_none());
        assert_eq!(rows[1]["status"], "skipped");
        assert!(rows[1].get("output_name").is_none());
        assert!(rows[1]["reason"].as_str().unwrap().contains("cancelled"));
    }

    #[test]
    fn full_region_preview_keeps_whole_image() {
        let region = CropRegion::from(NormalizedRegion::full());
        let items = vec![(
            "a.png".to_string(),
            Ok(Dimensions {
                width: 4,
                height: 3,
            }),
        )];
        let lines = format_region_preview(&region, &items);
        assert_eq!(lines[1], "001 a.png 4x3 → (0,0,4,3) 4x3");
    }
}
