use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use band_blur::{BlurOptions, Distribution, HaloPolicy, Phase, PhaseTimings};
use serde::Serialize;

/// Timings of one run of the tool. Durations are in seconds.
#[derive(Debug, Serialize)]
pub struct Summary {
    /// "serial" for a single worker, "parallel" otherwise.
    pub implementation: &'static str,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub width: u32,
    pub height: u32,
    pub radius: u32,
    pub workers: u32,
    pub halo: &'static str,
    pub distribution: &'static str,
    pub read: f64,
    /// Convolution of the coordinator's band, without distribution of
    /// rows and collection of bands.
    pub blur: f64,
    /// The whole blur call.
    pub total: f64,
    pub write: f64,
    pub phases: BTreeMap<&'static str, f64>,
    pub worker_times: Vec<f64>,
}

impl Summary {
    pub fn new(
        source: &Path,
        destination: &Path,
        (width, height): (u32, u32),
        options: &BlurOptions,
        timings: &PhaseTimings,
    ) -> Self {
        let workers = options.workers.get();
        Self {
            implementation: if workers == 1 { "serial" } else { "parallel" },
            source: source.to_owned(),
            destination: destination.to_owned(),
            width,
            height,
            radius: options.radius,
            workers,
            halo: match options.halo {
                HaloPolicy::Exact => "exact",
                HaloPolicy::Legacy => "legacy",
            },
            distribution: match options.distribution {
                Distribution::Broadcast => "broadcast",
                Distribution::HaloExchange => "halo-exchange",
            },
            read: 0.,
            blur: timings.phase(Phase::Convolution).as_secs_f64(),
            total: 0.,
            write: 0.,
            phases: timings
                .phases()
                .into_iter()
                .map(|(phase, elapsed)| (phase.name(), elapsed.as_secs_f64()))
                .collect(),
            worker_times: timings
                .workers()
                .into_iter()
                .map(|(_, elapsed)| elapsed.as_secs_f64())
                .collect(),
        }
    }

    pub fn durations(mut self, read: Duration, total: Duration, write: Duration) -> Self {
        self.read = read.as_secs_f64();
        self.total = total.as_secs_f64();
        self.write = write.as_secs_f64();
        self
    }

    pub fn print(&self) {
        println!("Execution Summary:");
        println!("Time taken for reading: {:.6} seconds", self.read);
        println!(
            "Time taken for Gaussian blur with {} radius: {:.6} seconds",
            self.radius, self.blur
        );
        println!(
            "Time taken for the whole blur call: {:.6} seconds",
            self.total
        );
        println!("Time taken for writing: {:.6} seconds", self.write);
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        fs::write(path, json).with_context(|| format!("Failed to write report into {:?}", path))
    }
}
