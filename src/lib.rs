#![doc = include_str!("../README.md")]
//!
//! ## Feature flags
#![doc = document_features::document_features!()]

pub use blurrer::{blur, Blurrer};
pub use convolution::{blur_image, blur_window};
pub use errors::*;
pub use kernel::GaussianKernel;
pub use observer::{BlurObserver, LogObserver, NoopObserver, Phase, PhaseTimings};
pub use options::{sanitize_radius, BlurOptions, Distribution, DEFAULT_RADIUS};
pub use partition::{partition_rows, HaloPolicy, WorkAssignment};

pub use crate::image::{Image, RowWindow, PIXEL_SIZE};

mod blurrer;
mod channels;
mod convolution;
mod errors;
mod image;
#[cfg(feature = "image")]
mod image_crate;
mod kernel;
mod observer;
mod options;
mod partition;
#[cfg(feature = "for_testing")]
pub mod testing;
mod worker;
