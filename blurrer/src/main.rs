use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use band_blur::{
    sanitize_radius, BlurObserver, BlurOptions, Blurrer, Image, LogObserver, Phase, PhaseTimings,
    WorkAssignment, DEFAULT_RADIUS,
};
use clap::Parser;
use image::{ImageReader, RgbaImage};
use log::{debug, info};

mod report;
mod structs;

#[derive(Parser)]
#[clap(version, about = "Blurs an image with a Gaussian kernel", long_about = None)]
struct Cli {
    /// Radius of the Gaussian kernel. Non-positive and non-numeric values
    /// are replaced by the default one
    #[clap(value_parser, allow_negative_numbers = true)]
    radius: Option<String>,

    /// Path to source image file
    #[clap(value_parser, default_value = "spidey.png")]
    source_path: PathBuf,

    /// Path to result image file [default: out_serial.png with one worker, out_mpi.png otherwise]
    #[clap(short, long, value_parser)]
    output: Option<PathBuf>,

    /// Count of workers, the main thread included
    #[clap(short, long, value_parser, default_value_t = NonZeroU32::MIN)]
    workers: NonZeroU32,

    /// Rows computed around the band of every worker
    #[clap(long, value_enum, default_value_t = structs::HaloPolicy::Exact)]
    halo: structs::HaloPolicy,

    /// The way workers get rows of the source image
    #[clap(long, value_enum, default_value_t = structs::Distribution::Broadcast)]
    distribution: structs::Distribution,

    /// Overwrite destination file
    #[clap(long, action)]
    overwrite: bool,

    /// Also save the execution summary as JSON into this file
    #[clap(long, value_parser)]
    report: Option<PathBuf>,

    #[clap(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

/// Collects timings of phases and writes them into the log.
#[derive(Default)]
struct CliObserver {
    timings: PhaseTimings,
}

impl BlurObserver for CliObserver {
    fn phase_completed(&self, phase: Phase, elapsed: Duration) {
        LogObserver.phase_completed(phase, elapsed);
        self.timings.phase_completed(phase, elapsed);
    }

    fn worker_completed(&self, assignment: &WorkAssignment, elapsed: Duration) {
        LogObserver.worker_completed(assignment, elapsed);
        self.timings.worker_completed(assignment, elapsed);
    }
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();
    let summary = blur_file(&cli)?;
    summary.print();
    if let Some(path) = &cli.report {
        summary.save(path)?;
    }
    Ok(())
}

fn blur_file(cli: &Cli) -> Result<report::Summary> {
    let options = blur_options(cli);
    let destination = destination_path(cli);
    if destination.exists() && !cli.overwrite {
        return Err(anyhow!(
            "Destination path {:?} already exists.",
            destination
        ));
    }

    let started = Instant::now();
    let mut image = open_source_image(&cli.source_path)?;
    let read_time = started.elapsed();
    let dimensions = (image.width(), image.height());

    info!("Starting Blurring Process");
    let blurrer = Blurrer::with_observer(CliObserver::default());
    let started = Instant::now();
    blurrer
        .blur(&mut image, &options)
        .with_context(|| "Failed to blur image")?;
    let total_blur_time = started.elapsed();
    info!("Blurring Process Completed");

    let started = Instant::now();
    save_result(&destination, image)?;
    let write_time = started.elapsed();

    let summary = report::Summary::new(
        &cli.source_path,
        &destination,
        dimensions,
        &options,
        &blurrer.observer().timings,
    );
    Ok(summary.durations(read_time, total_blur_time, write_time))
}

fn blur_options(cli: &Cli) -> BlurOptions {
    let radius = match &cli.radius {
        Some(radius) => sanitize_radius(leading_integer(radius)),
        None => {
            info!("No blur radius specified. Using default value: {DEFAULT_RADIUS}");
            DEFAULT_RADIUS
        }
    };
    info!("Using blur radius: {radius}");
    BlurOptions::new()
        .radius(radius)
        .workers(cli.workers)
        .halo(cli.halo.into())
        .distribution(cli.distribution.into())
}

/// Integer from the leading sign and digits of the string, like C's `atoi`.
///
/// Zero is returned if there are no digits. Values which don't fit into
/// `i64` saturate, so they are replaced by the default radius as well.
fn leading_integer(value: &str) -> i64 {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let number = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add((d - b'0') as i64)
        });
    if negative {
        -number
    } else {
        number
    }
}

fn destination_path(cli: &Cli) -> PathBuf {
    match &cli.output {
        Some(path) => path.clone(),
        None if cli.workers.get() == 1 => PathBuf::from("out_serial.png"),
        None => PathBuf::from("out_mpi.png"),
    }
}

fn open_source_image(source_path: &Path) -> Result<Image> {
    info!("Reading image from {:?}", source_path);
    let image = ImageReader::open(source_path)
        .with_context(|| format!("Failed to read source file from {:?}", source_path))?
        .decode()
        .with_context(|| "Failed to decode source image")?;
    debug!("Source image has {:?} color type", image.color());
    let image = Image::try_from(image.to_rgba8())
        .with_context(|| "Failed to create source image pixels container")?;
    info!(
        "Image read successfully, dimensions: {} x {}",
        image.width(),
        image.height()
    );
    Ok(image)
}

fn save_result(result_path: &Path, image: Image) -> Result<()> {
    info!("Writing image to {:?}", result_path);
    let image = RgbaImage::try_from(image).with_context(|| "Failed to convert result image")?;
    image
        .save(result_path)
        .with_context(|| "Failed to save the result image")?;
    info!("Image written successfully");
    Ok(())
}
