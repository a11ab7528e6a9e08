use clap::{Parser, Subcommand};
use shotcrop::geometry::{Rectangle, Selection};
use shotcrop::imaging::{ImageCodec, RustCodec};
use shotcrop::process::{
    BatchCropProcessor, BatchSummary, CancelToken, ProcessError, resolve_region,
};
use shotcrop::upload::UploadedImage;
use shotcrop::{archive, config, output, upload};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shotcrop")]
#[command(about = "Batch-crop screenshots with one region and zip the results")]
#[command(long_about = "\
Batch-crop screenshots with one region and zip the results

Pick the region once and it is applied to every image:

  --cut-height N     shave N pixels off the top of every image (default 130)
  --rect L,T,R,B     rectangle measured on the reference image (--reference N,
                     1-based, default the first image); scaled proportionally
                     onto images of other sizes

Cropped images are stored as NNN_<original name>, in input order. Images that
cannot be read are skipped and listed in the summary.

Run 'shotcrop gen-config' to generate a documented shotcrop.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./shotcrop.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Region selection flags shared by `crop` and `region`.
#[derive(clap::Args, Clone)]
struct SelectionArgs {
    /// Image files or directories (PNG/JPEG, scanned one level deep)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Crop rectangle on the reference image, in pixels
    #[arg(long, value_name = "L,T,R,B", conflicts_with = "cut_height")]
    rect: Option<Rectangle>,

    /// 1-based position of the reference image for --rect
    #[arg(long, value_name = "N", default_value_t = 1)]
    reference: usize,

    /// Pixels to remove from the top of every image
    #[arg(long, value_name = "PX")]
    cut_height: Option<u32>,
}

impl SelectionArgs {
    fn selection(&self, config: &config::CropConfig) -> Selection {
        match self.rect {
            Some(rect) => Selection::Rectangle(rect),
            None => Selection::FixedOffset {
                cut_height: self.cut_height.unwrap_or(config.selection.cut_height),
            },
        }
    }

    /// The reference upload, when the selection needs one.
    fn reference<'a>(
        &self,
        images: &'a [UploadedImage],
    ) -> Result<Option<&'a UploadedImage>, String> {
        if self.rect.is_none() {
            return Ok(None);
        }
        self.reference
            .checked_sub(1)
            .and_then(|i| images.get(i))
            .map(Some)
            .ok_or_else(|| {
                format!(
                    "--reference {} is out of range (1-{})",
                    self.reference,
                    images.len()
                )
            })
    }
}

#[derive(Subcommand)]
enum Command {
    /// Crop every input and write the zip archive
    Crop {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Archive path (default: output.archive_name from config)
        #[arg(long = "output", short = 'o', value_name = "PATH")]
        archive_path: Option<PathBuf>,

        /// Write a JSON report of per-image results
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },
    /// Show the resolved region and where it lands on each input, without cropping
    Region {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Print a stock shotcrop.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Crop {
            selection,
            archive_path,
            report,
        } => {
            let config = config::load_config(cli.config.as_deref(), Path::new("."))?;
            let images = load_inputs(&selection.inputs)?;
            let codec = RustCodec::with_quality(config.quality());
            let region = resolve_region(
                &codec,
                selection.selection(&config),
                selection.reference(&images)?,
            )?;
            init_thread_pool(&config.processing);

            let cancel = CancelToken::new();
            let handler_token = cancel.clone();
            ctrlc::set_handler(move || handler_token.cancel())?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let mut processor = BatchCropProcessor::new(&codec);
            processor.select_region(region);
            let results = processor.run(&images, &tx, &cancel);
            drop(tx);
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let results = results?;

            if cancel.is_cancelled() {
                warn!("interrupted; archiving the images finished so far");
            }

            let summary = BatchSummary::from_results(&results);
            let written = if summary.has_output() {
                let archive = archive::build(&results, config.output.compression)?;
                let path =
                    archive_path.unwrap_or_else(|| PathBuf::from(&config.output.archive_name));
                std::fs::write(&path, &archive.bytes)?;
                info!(path = %path.display(), bytes = archive.bytes.len(), "archive written");
                Some((path, archive.entries.len()))
            } else {
                None
            };

            if let Some(report_path) = report {
                std::fs::write(&report_path, output::format_results_json(&results)?)?;
                info!(path = %report_path.display(), "report written");
            }

            output::print_summary(
                &summary,
                written.as_ref().map(|(path, count)| (path.as_path(), *count)),
            );
        }
        Command::Region { selection } => {
            let config = config::load_config(cli.config.as_deref(), Path::new("."))?;
            let images = load_inputs(&selection.inputs)?;
            let codec = RustCodec::with_quality(config.quality());
            let region = resolve_region(
                &codec,
                selection.selection(&config),
                selection.reference(&images)?,
            )?;
            let items: Vec<_> = images
                .iter()
                .map(|image| (image.name.clone(), codec.identify(&image.bytes)))
                .collect();
            output::print_region_preview(&region, &items);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Collect uploads; an empty batch is an error before anything else runs.
fn load_inputs(paths: &[PathBuf]) -> Result<Vec<UploadedImage>, Box<dyn std::error::Error>> {
    let images = upload::collect_inputs(paths)?;
    if images.is_empty() {
        return Err(ProcessError::NoImages.into());
    }
    info!(count = images.len(), "collected inputs");
    Ok(images)
}

/// Log to stderr. Defaults to `warn`; `-v` → `info`, `-vv` → `debug`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
