use band_blur as bb;

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum HaloPolicy {
    /// Convolve `radius` rows around the owned band. Result doesn't depend
    /// on count of workers.
    Exact,
    /// Convolve a range twice as tall as the owned band. Rows near
    /// borders of bands may differ from a single-worker run.
    Legacy,
}

impl From<HaloPolicy> for bb::HaloPolicy {
    fn from(halo: HaloPolicy) -> Self {
        match halo {
            HaloPolicy::Exact => bb::HaloPolicy::Exact,
            HaloPolicy::Legacy => bb::HaloPolicy::Legacy,
        }
    }
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum Distribution {
    /// Every worker gets a copy of the whole image.
    Broadcast,
    /// Every worker gets only its rows and exchanges halo rows with others.
    HaloExchange,
}

impl From<Distribution> for bb::Distribution {
    fn from(distribution: Distribution) -> Self {
        match distribution {
            Distribution::Broadcast => bb::Distribution::Broadcast,
            Distribution::HaloExchange => bb::Distribution::HaloExchange,
        }
    }
}
