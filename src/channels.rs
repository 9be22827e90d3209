//! Message passing between the coordinator and workers of a run.
//!
//! Every worker has a private channel for commands from the coordinator
//! and a private channel for reports back to it, so a worker that
//! disappears is noticed as a disconnected channel. Workers that exchange
//! halo rows also hold one sender to every other worker.
use std::ops::Range;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use crate::image::try_copy_rows;
use crate::partition::WorkAssignment;
use crate::{BlurError, Image, ImageRowsError};

/// Messages from the coordinator to a worker.
pub(crate) enum Command {
    /// Read-only copy of the whole source image.
    Replica(Arc<Image>),
    /// Rows owned by the worker.
    OwnedRows(Vec<Vec<u8>>),
    /// All workers hold their rows, the convolution may begin.
    Start,
}

/// Messages from a worker to the coordinator.
pub(crate) enum Report {
    Ready,
    Band(ResultBand),
    Failed(BlurError),
}

/// Rows of one worker sent to another one to complete its halo.
pub(crate) struct HaloRows {
    pub first_row: u32,
    pub rows: Vec<Vec<u8>>,
}

/// Owned rows of a worker after convolution.
#[derive(Debug)]
pub(crate) struct ResultBand {
    pub worker_index: usize,
    pub first_row: u32,
    pub rows: Vec<Vec<u8>>,
}

/// Endpoints of one worker.
pub(crate) struct WorkerLink {
    pub assignment: WorkAssignment,
    pub commands: Receiver<Command>,
    pub reports: Sender<Report>,
    pub halo_in: Receiver<HaloRows>,
    /// Senders to other workers with their assignments.
    pub peers: Vec<(WorkAssignment, Sender<HaloRows>)>,
    /// Assignments of all workers of the run.
    pub owners: Vec<WorkAssignment>,
}

impl WorkerLink {
    #[inline]
    pub fn worker_index(&self) -> usize {
        self.assignment.worker_index
    }

    pub fn recv_command(&self) -> Result<Command, BlurError> {
        self.commands
            .recv()
            .map_err(|_| BlurError::WorkerDisconnected { worker: 0 })
    }

    pub fn report(&self, report: Report) -> Result<(), BlurError> {
        self.reports
            .send(report)
            .map_err(|_| BlurError::WorkerDisconnected { worker: 0 })
    }

    /// Sends to every other worker the owned rows it needs for its halo.
    ///
    /// Senders are dropped afterwards, so receivers of workers see
    /// a disconnected channel if some rows never arrive.
    pub fn send_halo(&mut self, owned_rows: &[Vec<u8>]) -> Result<(), BlurError> {
        let owned = self.assignment.owned_rows();
        for (peer, sender) in self.peers.drain(..) {
            for halo in peer.halo_rows() {
                let overlap = intersect(&owned, &halo);
                if overlap.is_empty() {
                    continue;
                }
                let local = (overlap.start - owned.start) as usize;
                let rows = &owned_rows[local..local + overlap.len()];
                let rows = try_copy_rows(rows, rows[0].len())?;
                sender
                    .send(HaloRows {
                        first_row: overlap.start,
                        rows,
                    })
                    .map_err(|_| BlurError::WorkerDisconnected {
                        worker: peer.worker_index,
                    })?;
            }
        }
        Ok(())
    }

    /// Receives halo rows from other workers and places them around the
    /// owned rows. Returns rows of the whole compute range.
    pub fn recv_halo(&self, owned_rows: Vec<Vec<u8>>) -> Result<Vec<Vec<u8>>, BlurError> {
        let worker = self.worker_index();
        let compute = self.assignment.compute_rows();
        let owned = self.assignment.owned_rows();
        let mut rows: Vec<Option<Vec<u8>>> = vec![None; compute.len()];
        for (i, row) in owned_rows.into_iter().enumerate() {
            rows[(owned.start - compute.start) as usize + i] = Some(row);
        }
        let mut missing = compute.len() - owned.len();
        while missing > 0 {
            let message = self.halo_in.recv().map_err(|_| {
                let first_missing = rows.iter().position(|row| row.is_none()).unwrap_or(0);
                let y = compute.start + first_missing as u32;
                let owner = self
                    .owners
                    .iter()
                    .find(|a| a.owned_rows().contains(&y))
                    .map_or(worker, |a| a.worker_index);
                BlurError::WorkerDisconnected { worker: owner }
            })?;
            let end_row = message.first_row + message.rows.len() as u32;
            if message.first_row < compute.start || end_row > compute.end {
                return Err(BlurError::UnexpectedMessage { worker });
            }
            for (i, row) in message.rows.into_iter().enumerate() {
                let slot = &mut rows[(message.first_row - compute.start) as usize + i];
                if slot.replace(row).is_some() {
                    return Err(BlurError::UnexpectedMessage { worker });
                }
                missing -= 1;
            }
        }
        rows.into_iter()
            .map(|row| row.ok_or(BlurError::UnexpectedMessage { worker }))
            .collect()
    }
}

/// Endpoints of the coordinator.
pub(crate) struct CoordinatorLink {
    pub commands: Vec<Sender<Command>>,
    pub reports: Vec<Receiver<Report>>,
}

impl CoordinatorLink {
    /// Gives every worker, including the coordinator itself, a read-only
    /// copy of the whole image. Workers make private replicas from it.
    pub fn broadcast(&self, image: &Arc<Image>) -> Result<(), BlurError> {
        for (worker, sender) in self.commands.iter().enumerate() {
            sender
                .send(Command::Replica(image.clone()))
                .map_err(|_| BlurError::WorkerDisconnected { worker })?;
        }
        Ok(())
    }

    /// Gives every worker only the rows it owns.
    pub fn scatter(&self, image: &Image, assignments: &[WorkAssignment]) -> Result<(), BlurError> {
        for (assignment, sender) in assignments.iter().zip(&self.commands) {
            let worker = assignment.worker_index;
            let owned = assignment.owned_rows();
            let rows = image
                .rows()
                .get(owned.start as usize..owned.end as usize)
                .ok_or(BlurError::UnexpectedMessage { worker })?;
            let rows = try_copy_rows(rows, image.row_size())?;
            sender
                .send(Command::OwnedRows(rows))
                .map_err(|_| BlurError::WorkerDisconnected { worker })?;
        }
        Ok(())
    }

    /// Waits until each of the given workers reports it is ready.
    pub fn wait_ready(&self, workers: Range<usize>) -> Result<(), BlurError> {
        for worker in workers {
            match self.recv_report(worker)? {
                Report::Ready => {}
                Report::Failed(err) => return Err(err),
                Report::Band(_) => return Err(BlurError::UnexpectedMessage { worker }),
            }
        }
        Ok(())
    }

    /// Lets the given workers start the convolution.
    pub fn release(&self, workers: Range<usize>) -> Result<(), BlurError> {
        for worker in workers {
            self.commands[worker]
                .send(Command::Start)
                .map_err(|_| BlurError::WorkerDisconnected { worker })?;
        }
        Ok(())
    }

    /// Receives a band of the worker.
    pub fn recv_band(&self, assignment: &WorkAssignment) -> Result<ResultBand, BlurError> {
        let worker = assignment.worker_index;
        match self.recv_report(worker)? {
            Report::Band(band) => Ok(band),
            Report::Failed(err) => Err(err),
            Report::Ready => Err(BlurError::UnexpectedMessage { worker }),
        }
    }

    fn recv_report(&self, worker: usize) -> Result<Report, BlurError> {
        self.reports[worker]
            .recv()
            .map_err(|_| BlurError::WorkerDisconnected { worker })
    }
}

/// Creates channels for the coordinator and all workers.
pub(crate) fn connect(assignments: &[WorkAssignment]) -> (CoordinatorLink, Vec<WorkerLink>) {
    let count = assignments.len();
    let mut commands = Vec::with_capacity(count);
    let mut reports = Vec::with_capacity(count);
    let mut halo_senders = Vec::with_capacity(count);
    let mut worker_parts = Vec::with_capacity(count);
    for _ in assignments {
        let (command_tx, command_rx) = channel();
        let (report_tx, report_rx) = channel();
        let (halo_tx, halo_rx) = channel();
        commands.push(command_tx);
        reports.push(report_rx);
        halo_senders.push(halo_tx);
        worker_parts.push((command_rx, report_tx, halo_rx));
    }

    let links = assignments
        .iter()
        .zip(worker_parts)
        .map(|(&assignment, (commands, reports, halo_in))| {
            let peers = assignments
                .iter()
                .zip(&halo_senders)
                .filter(|(peer, _)| peer.worker_index != assignment.worker_index)
                .map(|(&peer, sender)| (peer, sender.clone()))
                .collect();
            WorkerLink {
                assignment,
                commands,
                reports,
                halo_in,
                peers,
                owners: assignments.to_vec(),
            }
        })
        .collect();
    (CoordinatorLink { commands, reports }, links)
}

/// Writes bands of all workers into the coordinator's image.
///
/// All bands are checked before the first one is written, so the image
/// is either fully updated or left untouched.
pub(crate) fn collect_bands(
    image: &mut Image,
    assignments: &[WorkAssignment],
    bands: Vec<ResultBand>,
) -> Result<(), BlurError> {
    if bands.len() != assignments.len() {
        return Err(BlurError::UnexpectedMessage {
            worker: bands.len().min(assignments.len()),
        });
    }
    let row_size = image.row_size();
    for (assignment, band) in assignments.iter().zip(&bands) {
        check_band(row_size, assignment, band)?;
    }
    for band in bands {
        let worker = band.worker_index;
        image
            .write_rows(band.first_row, band.rows)
            .map_err(|_: ImageRowsError| BlurError::UnexpectedMessage { worker })?;
    }
    Ok(())
}

fn check_band(
    row_size: usize,
    assignment: &WorkAssignment,
    band: &ResultBand,
) -> Result<(), BlurError> {
    let worker = assignment.worker_index;
    if band.worker_index != worker
        || band.first_row != assignment.owned_row_start
        || band.rows.len() != assignment.owned_row_count as usize
        || band.rows.iter().any(|row| row.len() != row_size)
    {
        return Err(BlurError::UnexpectedMessage { worker });
    }
    Ok(())
}

fn intersect(a: &Range<u32>, b: &Range<u32>) -> Range<u32> {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end).max(start);
    start..end
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::thread;

    use super::*;
    use crate::partition::{partition_rows, HaloPolicy};

    fn nz(v: u32) -> NonZeroU32 {
        NonZeroU32::new(v).unwrap()
    }

    fn numbered_rows(range: Range<u32>) -> Vec<Vec<u8>> {
        range.map(|y| vec![y as u8; 8]).collect()
    }

    #[test]
    fn halo_exchange_completes_compute_ranges() {
        // Radius is greater than height of bands, so halos reach
        // further than the nearest neighbours.
        let assignments = partition_rows(10, nz(5), 3, HaloPolicy::Exact);
        let (_coordinator, links) = connect(&assignments);
        let results: Vec<Vec<Vec<u8>>> = thread::scope(|s| {
            let handles: Vec<_> = links
                .into_iter()
                .map(|mut link| {
                    s.spawn(move || {
                        let owned = numbered_rows(link.assignment.owned_rows());
                        link.send_halo(&owned).unwrap();
                        link.recv_halo(owned).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for (assignment, rows) in assignments.iter().zip(results) {
            assert_eq!(rows, numbered_rows(assignment.compute_rows()));
        }
    }

    #[test]
    fn missing_halo_rows_are_reported() {
        let assignments = partition_rows(6, nz(2), 2, HaloPolicy::Exact);
        let (_coordinator, mut links) = connect(&assignments);
        let second = links.pop().unwrap();
        // The second worker leaves without sending anything.
        drop(second);
        let first = links.pop().unwrap();
        let owned = numbered_rows(first.assignment.owned_rows());
        assert_eq!(
            first.recv_halo(owned),
            Err(BlurError::WorkerDisconnected { worker: 1 })
        );
    }

    #[test]
    fn scatter_rejects_rows_outside_of_image() {
        // Assignments are made for a taller image than the scattered one.
        let assignments = partition_rows(8, nz(2), 1, HaloPolicy::Exact);
        let (coordinator, _links) = connect(&assignments);
        let image = Image::new(nz(2), nz(4));
        assert_eq!(
            coordinator.scatter(&image, &assignments),
            Err(BlurError::UnexpectedMessage { worker: 1 })
        );
    }

    #[test]
    fn collect_bands_checks_assignments() {
        let assignments = partition_rows(4, nz(2), 1, HaloPolicy::Exact);
        let mut image = Image::new(nz(2), nz(4));
        let first = || ResultBand {
            worker_index: 0,
            first_row: 0,
            rows: numbered_rows(0..2),
        };
        let wrong_second = ResultBand {
            worker_index: 1,
            first_row: 1,
            rows: numbered_rows(1..3),
        };
        assert_eq!(
            collect_bands(&mut image, &assignments, vec![first(), wrong_second]),
            Err(BlurError::UnexpectedMessage { worker: 1 })
        );
        // Nothing is written if any band is wrong.
        assert_eq!(image, Image::new(nz(2), nz(4)));

        assert_eq!(
            collect_bands(&mut image, &assignments, vec![first()]),
            Err(BlurError::UnexpectedMessage { worker: 1 })
        );

        let second = ResultBand {
            worker_index: 1,
            first_row: 2,
            rows: numbered_rows(2..4),
        };
        collect_bands(&mut image, &assignments, vec![first(), second]).unwrap();
        assert_eq!(image.row(3), Some([3u8; 8].as_slice()));
        assert_eq!(image.row(1), Some([1u8; 8].as_slice()));
    }
}
