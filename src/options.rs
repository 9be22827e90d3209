use std::num::NonZeroU32;

use crate::HaloPolicy;

/// Radius used instead of a non-positive one.
pub const DEFAULT_RADIUS: u32 = 10;

/// Turns a radius given by a user into a valid one.
///
/// Zero, negative and too large values are replaced by [DEFAULT_RADIUS].
pub fn sanitize_radius(radius: i64) -> u32 {
    match u32::try_from(radius) {
        Ok(radius) if radius > 0 => radius,
        _ => {
            log::info!("Invalid blur radius. Using default value: {DEFAULT_RADIUS}");
            #[cfg(feature = "for_testing")]
            crate::testing::log_message("sanitize_radius: default radius");
            DEFAULT_RADIUS
        }
    }
}

/// The way rows of the source image reach workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distribution {
    /// Every worker gets a private copy of the whole image.
    #[default]
    Broadcast,
    /// Every worker gets only its owned rows and receives halo rows
    /// from workers which own them.
    HaloExchange,
}

/// Options of a blur run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct BlurOptions {
    pub radius: u32,
    pub workers: NonZeroU32,
    pub halo: HaloPolicy,
    pub distribution: Distribution,
}

impl Default for BlurOptions {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            workers: NonZeroU32::MIN,
            halo: HaloPolicy::default(),
            distribution: Distribution::default(),
        }
    }
}

impl BlurOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Radius of the Gaussian kernel. Zero radius leaves the image unchanged.
    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    /// Count of workers, the coordinator included.
    pub fn workers(mut self, workers: NonZeroU32) -> Self {
        self.workers = workers;
        self
    }

    pub fn halo(mut self, halo: HaloPolicy) -> Self {
        self.halo = halo;
        self
    }

    pub fn distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }
}
