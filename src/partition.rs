use std::num::NonZeroU32;
use std::ops::Range;

/// How many rows around an owned band a worker has to convolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HaloPolicy {
    /// `radius` rows above and below the owned band, clamped to image
    /// edges. Result doesn't depend on count of workers.
    #[default]
    Exact,
    /// Compute range starts `radius` rows above the owned band and is
    /// twice as tall as the band. When the band is shorter than `radius`
    /// such a range would end inside the band, so its end is moved to the
    /// end of the band. Owned rows close to the end of the band may be
    /// computed without enough neighbours if `radius` is greater than the
    /// height of the band.
    Legacy,
}

/// Rows of the image a worker is accountable for and rows it has to
/// convolve to make the former correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkAssignment {
    pub worker_index: usize,
    pub owned_row_start: u32,
    pub owned_row_count: u32,
    pub compute_row_start: u32,
    pub compute_row_count: u32,
}

impl WorkAssignment {
    #[inline]
    pub fn owned_rows(&self) -> Range<u32> {
        self.owned_row_start..self.owned_row_start + self.owned_row_count
    }

    #[inline]
    pub fn compute_rows(&self) -> Range<u32> {
        self.compute_row_start..self.compute_row_start + self.compute_row_count
    }

    /// Rows of the compute range which are owned by other workers.
    pub fn halo_rows(&self) -> [Range<u32>; 2] {
        let owned = self.owned_rows();
        let compute = self.compute_rows();
        [compute.start..owned.start, owned.end..compute.end.max(owned.end)]
    }
}

/// Splits rows `[0, height)` into contiguous bands, one per worker.
///
/// First `height % workers` workers get one extra row. Workers are
/// allowed to own zero rows if there are fewer rows than workers.
pub fn partition_rows(
    height: u32,
    workers: NonZeroU32,
    radius: u32,
    halo: HaloPolicy,
) -> Vec<WorkAssignment> {
    let num_parts = workers.get();
    let step = height / num_parts;
    let mut modulo = height % num_parts;
    let mut top = 0;
    let mut res = Vec::with_capacity(num_parts as usize);
    for worker_index in 0..num_parts as usize {
        let mut part_height = step;
        if modulo > 0 {
            part_height += 1;
            modulo -= 1;
        }
        res.push(assignment(worker_index, top, part_height, height, radius, halo));
        top += part_height;
    }
    res
}

fn assignment(
    worker_index: usize,
    owned_row_start: u32,
    owned_row_count: u32,
    height: u32,
    radius: u32,
    halo: HaloPolicy,
) -> WorkAssignment {
    if owned_row_count == 0 {
        return WorkAssignment {
            worker_index,
            owned_row_start,
            owned_row_count,
            compute_row_start: owned_row_start,
            compute_row_count: 0,
        };
    }
    let owned_end = owned_row_start + owned_row_count;
    let compute_row_start = owned_row_start.saturating_sub(radius);
    let compute_end = match halo {
        HaloPolicy::Exact => owned_end.saturating_add(radius).min(height),
        HaloPolicy::Legacy => compute_row_start
            .saturating_add(owned_row_count.saturating_mul(2))
            .max(owned_end)
            .min(height),
    };
    WorkAssignment {
        worker_index,
        owned_row_start,
        owned_row_count,
        compute_row_start,
        compute_row_count: compute_end - compute_row_start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(v: u32) -> NonZeroU32 {
        NonZeroU32::new(v).unwrap()
    }

    #[test]
    fn owned_bands_cover_all_rows() {
        for height in [1, 2, 7, 100, 1023] {
            for workers in 1..=12 {
                let parts = partition_rows(height, nz(workers), 3, HaloPolicy::Exact);
                assert_eq!(parts.len(), workers as usize);
                let mut next_row = 0;
                for (i, part) in parts.iter().enumerate() {
                    assert_eq!(part.worker_index, i);
                    assert_eq!(part.owned_row_start, next_row);
                    next_row += part.owned_row_count;
                }
                assert_eq!(next_row, height);
            }
        }
    }

    #[test]
    fn remainder_goes_to_first_workers() {
        let parts = partition_rows(10, nz(4), 0, HaloPolicy::Exact);
        let counts: Vec<u32> = parts.iter().map(|p| p.owned_row_count).collect();
        assert_eq!(counts, [3, 3, 2, 2]);
    }

    #[test]
    fn exact_halo_has_radius_rows_on_both_sides() {
        let height = 50;
        let radius = 4;
        for part in partition_rows(height, nz(5), radius, HaloPolicy::Exact) {
            let owned = part.owned_rows();
            let compute = part.compute_rows();
            assert_eq!(compute.start, owned.start.saturating_sub(radius));
            assert_eq!(compute.end, (owned.end + radius).min(height));
        }
    }

    #[test]
    fn compute_range_contains_owned_range() {
        for halo in [HaloPolicy::Exact, HaloPolicy::Legacy] {
            for radius in [0, 1, 5, 40] {
                for part in partition_rows(37, nz(6), radius, halo) {
                    assert!(part.compute_row_start <= part.owned_row_start);
                    assert!(part.compute_rows().end >= part.owned_rows().end);
                    assert!(part.compute_rows().end <= 37);
                }
            }
        }
    }

    #[test]
    fn legacy_halo_is_twice_owned_rows() {
        let parts = partition_rows(100, nz(4), 10, HaloPolicy::Legacy);
        let compute: Vec<(u32, u32)> = parts
            .iter()
            .map(|p| (p.compute_row_start, p.compute_row_count))
            .collect();
        assert_eq!(compute, [(0, 50), (15, 50), (40, 50), (65, 35)]);
    }

    #[test]
    fn legacy_halo_covers_short_bands() {
        // Band 6..9 with radius 5 starts at row 1, twice its height gives
        // 1..7 which stops before the band ends.
        let parts = partition_rows(12, nz(4), 5, HaloPolicy::Legacy);
        assert_eq!(parts[2].owned_rows(), 6..9);
        assert_eq!(parts[2].compute_rows(), 1..9);
        assert_eq!(parts[0].compute_rows(), 0..6);
    }

    #[test]
    fn more_workers_than_rows() {
        let parts = partition_rows(3, nz(5), 2, HaloPolicy::Exact);
        let owned: Vec<u32> = parts.iter().map(|p| p.owned_row_count).collect();
        assert_eq!(owned, [1, 1, 1, 0, 0]);
        assert_eq!(parts[4].compute_row_count, 0);
        assert_eq!(parts[1].compute_rows(), 0..3);
    }

    #[test]
    fn halo_rows_exclude_owned_rows() {
        let parts = partition_rows(30, nz(3), 2, HaloPolicy::Exact);
        assert_eq!(parts[1].halo_rows(), [8..10, 20..22]);
        assert_eq!(parts[0].halo_rows(), [0..0, 10..12]);
    }
}
