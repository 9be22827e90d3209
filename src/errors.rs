use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRowsError {
    #[error("Count of rows don't match to image height")]
    InvalidRowsCount,
    #[error("Size of row don't match to image width")]
    InvalidRowSize,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageBufferError {
    #[error("Size of buffer don't match to image dimensions")]
    InvalidBufferSize,
}

/// Terminal failure of a blur run.
///
/// None of these errors are retried: a failure of any worker aborts
/// the whole run and the coordinator's image is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BlurError {
    #[error("Failed to allocate {bytes} bytes for a copy of image rows")]
    AllocationFailure { bytes: usize },
    #[error("Channel of worker #{worker} was disconnected before the run finished")]
    WorkerDisconnected { worker: usize },
    #[error("Worker #{worker} panicked")]
    WorkerPanicked { worker: usize },
    #[error("Worker #{worker} got a message that doesn't match to its assignment")]
    UnexpectedMessage { worker: usize },
}
