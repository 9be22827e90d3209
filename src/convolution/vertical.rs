use std::ops::Range;

use super::{clip_channel, process_rows};
use crate::image::WindowMut;
use crate::GaussianKernel;

/// Blurs every row from `rows` along the Y axis.
///
/// Source rows are read from a snapshot of the window taken after
/// the horizontal pass. Row indexes are clamped to the height of the
/// whole image first and then to the rows held by the window.
pub(crate) fn vert_convolution(window: &mut WindowMut, kernel: &GaussianKernel, rows: Range<u32>) {
    let radius = kernel.radius();
    let window_rows = window.row_range();
    let max_y = window.image_height - 1;

    // Only these rows may be read by the pass.
    let snapshot_start = rows.start.saturating_sub(radius).max(window_rows.start);
    let snapshot_end = rows
        .end
        .saturating_add(radius)
        .min(window.image_height)
        .min(window_rows.end);
    let first_row = window.first_row;
    let local = move |y: u32| (y - first_row) as usize;
    let snapshot = window.rows[local(snapshot_start)..local(snapshot_end)].to_vec();
    debug_assert!(!snapshot.is_empty());

    let weights = kernel.weights();
    let start = local(rows.start);
    let end = local(rows.end);
    process_rows(&mut window.rows[start..end], rows.start, |y, dst_row| {
        let mut ss = vec![0f64; dst_row.len()];
        for (i, &w) in weights.iter().enumerate() {
            let src_y = (y as i64 + i as i64 - radius as i64).clamp(0, max_y as i64) as u32;
            let src_y = src_y.clamp(snapshot_start, snapshot_end - 1);
            let src_row = &snapshot[(src_y - snapshot_start) as usize];
            for (s, &c) in ss.iter_mut().zip(src_row.iter()) {
                *s += c as f64 * w;
            }
        }
        for (d, s) in dst_row.iter_mut().zip(ss) {
            *d = clip_channel(s);
        }
    });
}
