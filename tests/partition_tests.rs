use band_blur::{partition_rows, HaloPolicy};

mod testing;
use testing::non_zero_u32;

#[test]
fn owned_rows_cover_image() {
    for height in [1, 2, 7, 100, 1081] {
        for workers in [1, 2, 3, 8, 13, 200] {
            for halo in [HaloPolicy::Exact, HaloPolicy::Legacy] {
                let assignments = partition_rows(height, non_zero_u32(workers), 4, halo);
                assert_eq!(assignments.len(), workers as usize);
                let mut next_row = 0;
                for (i, assignment) in assignments.iter().enumerate() {
                    assert_eq!(assignment.worker_index, i);
                    let owned = assignment.owned_rows();
                    assert_eq!(owned.start, next_row);
                    next_row = owned.end;

                    let compute = assignment.compute_rows();
                    assert!(compute.start <= owned.start);
                    assert!(compute.end >= owned.end);
                    assert!(compute.end <= height);
                }
                assert_eq!(next_row, height);
            }
        }
    }
}

#[test]
fn exact_halo_reaches_radius_or_edge() {
    let radius = 6;
    for assignment in partition_rows(50, non_zero_u32(7), radius, HaloPolicy::Exact) {
        let owned = assignment.owned_rows();
        let compute = assignment.compute_rows();
        assert_eq!(compute.start, owned.start.saturating_sub(radius));
        assert_eq!(compute.end, (owned.end + radius).min(50));
    }
}

#[test]
fn sizes_of_bands_differ_by_one_row() {
    let assignments = partition_rows(1081, non_zero_u32(4), 10, HaloPolicy::Exact);
    let counts: Vec<u32> = assignments.iter().map(|a| a.owned_row_count).collect();
    assert_eq!(counts, [271, 270, 270, 270]);
}
