use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::WorkAssignment;

/// Stage of a blur run whose duration is reported to an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Delivering rows of the source image to workers.
    Distribution,
    /// Convolution of the coordinator's own band, from the moment
    /// all workers are released.
    Convolution,
    /// Waiting for bands of other workers and writing them into the image.
    Collection,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Distribution => "distribution",
            Self::Convolution => "convolution",
            Self::Collection => "collection",
        }
    }
}

/// Receiver of timings of a blur run.
///
/// Methods of workers are called from their threads.
pub trait BlurObserver: Sync {
    fn phase_completed(&self, _phase: Phase, _elapsed: Duration) {}

    fn worker_completed(&self, _assignment: &WorkAssignment, _elapsed: Duration) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BlurObserver for NoopObserver {}

/// Observer that writes timings as debug records of the `log` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl BlurObserver for LogObserver {
    fn phase_completed(&self, phase: Phase, elapsed: Duration) {
        log::debug!("{} took {:?}", phase.name(), elapsed);
    }

    fn worker_completed(&self, assignment: &WorkAssignment, elapsed: Duration) {
        log::debug!(
            "worker #{} blurred rows {:?} (computed {:?}) in {:?}",
            assignment.worker_index,
            assignment.owned_rows(),
            assignment.compute_rows(),
            elapsed,
        );
    }
}

/// Accumulates timings of phases and workers to read them after a run.
#[derive(Debug, Default)]
pub struct PhaseTimings {
    phases: Mutex<Vec<(Phase, Duration)>>,
    workers: Mutex<Vec<(usize, Duration)>>,
}

impl PhaseTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time spent in the phase by all runs observed so far.
    pub fn phase(&self, phase: Phase) -> Duration {
        let phases = self.phases.lock().unwrap_or_else(PoisonError::into_inner);
        phases
            .iter()
            .filter(|(p, _)| *p == phase)
            .map(|(_, elapsed)| *elapsed)
            .sum()
    }

    /// Phases in the order they were completed.
    pub fn phases(&self) -> Vec<(Phase, Duration)> {
        self.phases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Convolution time of every worker, ordered by worker index.
    pub fn workers(&self) -> Vec<(usize, Duration)> {
        let mut workers = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        workers.sort_by_key(|(worker, _)| *worker);
        workers
    }
}

impl BlurObserver for PhaseTimings {
    fn phase_completed(&self, phase: Phase, elapsed: Duration) {
        self.phases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((phase, elapsed));
    }

    fn worker_completed(&self, assignment: &WorkAssignment, elapsed: Duration) {
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((assignment.worker_index, elapsed));
    }
}

impl<T: BlurObserver + ?Sized> BlurObserver for &T {
    fn phase_completed(&self, phase: Phase, elapsed: Duration) {
        (**self).phase_completed(phase, elapsed)
    }

    fn worker_completed(&self, assignment: &WorkAssignment, elapsed: Duration) {
        (**self).worker_completed(assignment, elapsed)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::{partition_rows, HaloPolicy};

    #[test]
    fn phase_timings_accumulate() {
        let timings = PhaseTimings::new();
        timings.phase_completed(Phase::Convolution, Duration::from_millis(3));
        timings.phase_completed(Phase::Distribution, Duration::from_millis(1));
        timings.phase_completed(Phase::Convolution, Duration::from_millis(4));
        assert_eq!(timings.phase(Phase::Convolution), Duration::from_millis(7));
        assert_eq!(timings.phase(Phase::Collection), Duration::ZERO);
        assert_eq!(timings.phases().len(), 3);

        let assignments = partition_rows(4, NonZeroU32::new(2).unwrap(), 1, HaloPolicy::Exact);
        timings.worker_completed(&assignments[1], Duration::from_millis(2));
        timings.worker_completed(&assignments[0], Duration::from_millis(5));
        assert_eq!(
            timings.workers(),
            vec![(0, Duration::from_millis(5)), (1, Duration::from_millis(2))]
        );
    }
}
