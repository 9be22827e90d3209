use std::num::NonZeroU32;
use std::time::Instant;

use crate::channels::{Command, Report, ResultBand, WorkerLink};
use crate::convolution::{blur_window, convolve_image_rows};
use crate::{BlurError, BlurObserver, GaussianKernel, Image, RowWindow};

/// Private rows of a worker which it convolves.
pub(crate) enum Replica {
    /// Full copy of the source image.
    Image(Image),
    /// Only rows of the compute range.
    Window(RowWindow),
}

impl Replica {
    /// Receives the rows from the coordinator and, if the worker got
    /// only its owned rows, completes them with halo rows of other workers.
    pub fn receive(
        link: &mut WorkerLink,
        width: NonZeroU32,
        height: NonZeroU32,
    ) -> Result<Self, BlurError> {
        match link.recv_command()? {
            Command::Replica(source) => Ok(Self::Image(source.try_clone()?)),
            Command::OwnedRows(owned_rows) => {
                let worker = link.worker_index();
                link.send_halo(&owned_rows)?;
                let rows = link.recv_halo(owned_rows)?;
                let first_row = link.assignment.compute_row_start;
                RowWindow::new(width, height, first_row, rows)
                    .map(Self::Window)
                    .map_err(|_| BlurError::UnexpectedMessage { worker })
            }
            Command::Start => Err(BlurError::UnexpectedMessage {
                worker: link.worker_index(),
            }),
        }
    }

    /// Convolves the compute range of the worker and extracts its owned rows.
    pub fn convolve(
        self,
        link: &WorkerLink,
        kernel: &GaussianKernel,
        observer: &dyn BlurObserver,
    ) -> Result<ResultBand, BlurError> {
        let assignment = &link.assignment;
        let worker = assignment.worker_index;
        let started = Instant::now();
        let rows = match self {
            Self::Image(mut image) => {
                convolve_image_rows(&mut image, kernel, assignment.compute_rows());
                let owned = assignment.owned_rows();
                let mut rows = image.into_rows();
                rows.truncate(owned.end as usize);
                rows.split_off(owned.start as usize)
            }
            Self::Window(mut window) => {
                blur_window(&mut window, kernel, assignment.compute_rows());
                window
                    .take_rows(assignment.owned_rows())
                    .ok_or(BlurError::UnexpectedMessage { worker })?
            }
        };
        observer.worker_completed(assignment, started.elapsed());
        Ok(ResultBand {
            worker_index: worker,
            first_row: assignment.owned_row_start,
            rows,
        })
    }
}

/// Body of a worker other than the coordinator.
///
/// Any failure is reported to the coordinator, which aborts the run.
pub(crate) fn run_worker(
    mut link: WorkerLink,
    width: NonZeroU32,
    height: NonZeroU32,
    kernel: &GaussianKernel,
    observer: &dyn BlurObserver,
) {
    let res = contribute(&mut link, width, height, kernel, observer);
    if let Err(err) = res {
        // The coordinator may be gone already, nothing else to do.
        let _ = link.report(Report::Failed(err));
    }
}

fn contribute(
    link: &mut WorkerLink,
    width: NonZeroU32,
    height: NonZeroU32,
    kernel: &GaussianKernel,
    observer: &dyn BlurObserver,
) -> Result<(), BlurError> {
    let replica = Replica::receive(link, width, height)?;
    link.report(Report::Ready)?;
    match link.recv_command()? {
        Command::Start => {}
        _ => {
            return Err(BlurError::UnexpectedMessage {
                worker: link.worker_index(),
            })
        }
    }
    let band = replica.convolve(link, kernel, observer)?;
    link.report(Report::Band(band))
}
