use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::channels::{collect_bands, connect, CoordinatorLink, ResultBand, WorkerLink};
use crate::convolution::blur_image;
use crate::worker::{run_worker, Replica};
use crate::{
    partition_rows, BlurError, BlurObserver, BlurOptions, Distribution, GaussianKernel, Image,
    NoopObserver, Phase, WorkAssignment,
};

/// Blurs the whole image by the calling thread.
pub fn blur(image: &mut Image, radius: u32) {
    blur_image(image, &GaussianKernel::new(radius));
}

/// Methods of this structure used to blur images by a group of workers.
///
/// The calling thread is the coordinator: it owns the image, blurs its
/// own band like every other worker and gathers bands of others.
#[derive(Debug, Default, Clone)]
pub struct Blurrer<O = NoopObserver> {
    observer: O,
}

impl Blurrer {
    pub fn new() -> Self {
        Self {
            observer: NoopObserver,
        }
    }
}

impl<O: BlurObserver> Blurrer<O> {
    /// Creates a blurrer that reports timings of every run to the observer.
    pub fn with_observer(observer: O) -> Self {
        Self { observer }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Blurs the image in place.
    ///
    /// With one worker the image is blurred directly by the calling thread.
    /// Otherwise `workers - 1` threads are spawned for the duration of
    /// the call. The image is changed only if all workers delivered
    /// their bands.
    pub fn blur(&self, image: &mut Image, options: &BlurOptions) -> Result<(), BlurError> {
        let kernel = GaussianKernel::new(options.radius);
        let assignments = partition_rows(
            image.height(),
            options.workers,
            options.radius,
            options.halo,
        );
        log::debug!(
            "blur {}x{} image with radius {} by {} worker(s)",
            image.width(),
            image.height(),
            options.radius,
            assignments.len(),
        );

        if let [assignment] = assignments.as_slice() {
            #[cfg(feature = "for_testing")]
            crate::testing::log_message("blur: single worker");
            let started = Instant::now();
            blur_image(image, &kernel);
            let elapsed = started.elapsed();
            self.observer.worker_completed(assignment, elapsed);
            self.observer.phase_completed(Phase::Convolution, elapsed);
            return Ok(());
        }
        self.blur_by_workers(image, &kernel, &assignments, options.distribution)
    }

    fn blur_by_workers(
        &self,
        image: &mut Image,
        kernel: &GaussianKernel,
        assignments: &[WorkAssignment],
        distribution: Distribution,
    ) -> Result<(), BlurError> {
        let (width, height) = image.dimensions();
        let (coordinator, mut links) = connect(assignments);
        let own_link = links.remove(0);
        let observer: &dyn BlurObserver = &self.observer;
        let source: &Image = image;

        let gathered = thread::scope(|s| {
            let handles: Vec<_> = links
                .into_iter()
                .map(|link| {
                    let worker = link.worker_index();
                    let handle =
                        s.spawn(move || run_worker(link, width, height, kernel, observer));
                    (worker, handle)
                })
                .collect();

            // All links of the coordinator are dropped on return, so workers
            // still waiting for messages see disconnected channels.
            let mut res = coordinate(coordinator, own_link, source, kernel, distribution, observer);

            for (worker, handle) in handles {
                if handle.join().is_err() {
                    log::debug!("worker #{worker} panicked");
                    if !matches!(res, Err(BlurError::WorkerPanicked { .. })) {
                        res = Err(BlurError::WorkerPanicked { worker });
                    }
                }
            }
            res
        });

        let (bands, collection_started) = gathered?;
        collect_bands(image, assignments, bands)?;
        observer.phase_completed(Phase::Collection, collection_started.elapsed());
        #[cfg(feature = "for_testing")]
        crate::testing::log_message("blur: bands collected");
        Ok(())
    }
}

/// Part of the run performed by the coordinator as worker #0.
///
/// Returns bands of all workers ordered by worker index and the moment
/// the coordinator started waiting for them.
fn coordinate(
    coordinator: CoordinatorLink,
    mut link: WorkerLink,
    image: &Image,
    kernel: &GaussianKernel,
    distribution: Distribution,
    observer: &dyn BlurObserver,
) -> Result<(Vec<ResultBand>, Instant), BlurError> {
    let (width, height) = image.dimensions();
    let workers = link.owners.len();

    let started = Instant::now();
    match distribution {
        Distribution::Broadcast => {
            #[cfg(feature = "for_testing")]
            crate::testing::log_message("blur: broadcast");
            let shared = Arc::new(image.try_clone()?);
            coordinator.broadcast(&shared)?;
        }
        Distribution::HaloExchange => {
            #[cfg(feature = "for_testing")]
            crate::testing::log_message("blur: halo exchange");
            coordinator.scatter(image, &link.owners)?;
        }
    }
    let replica = Replica::receive(&mut link, width, height)?;
    coordinator.wait_ready(1..workers)?;
    observer.phase_completed(Phase::Distribution, started.elapsed());

    coordinator.release(1..workers)?;
    let started = Instant::now();
    let own_band = replica.convolve(&link, kernel, observer)?;
    observer.phase_completed(Phase::Convolution, started.elapsed());

    let collection_started = Instant::now();
    let mut bands = Vec::with_capacity(workers);
    bands.push(own_band);
    for assignment in &link.owners[1..] {
        bands.push(coordinator.recv_band(assignment)?);
    }
    Ok((bands, collection_started))
}
