use std::ops::Range;

use super::{clip_channel, process_rows};
use crate::image::WindowMut;
use crate::{GaussianKernel, PIXEL_SIZE};

/// Blurs every row from `rows` along the X axis.
///
/// Each row reads only its own pixels, so a copy of the row taken
/// before writing is the snapshot of the pass.
pub(crate) fn horiz_convolution(window: &mut WindowMut, kernel: &GaussianKernel, rows: Range<u32>) {
    let start = (rows.start - window.first_row) as usize;
    let end = (rows.end - window.first_row) as usize;
    process_rows(&mut window.rows[start..end], rows.start, |_, dst_row| {
        let src_row = dst_row.to_vec();
        convolve_row(&src_row, dst_row, kernel);
    });
}

#[inline]
fn convolve_row(src_row: &[u8], dst_row: &mut [u8], kernel: &GaussianKernel) {
    let radius = kernel.radius() as i64;
    let max_x = (src_row.len() / PIXEL_SIZE) as i64 - 1;
    let weights = kernel.weights();

    for (x, dst_pixel) in dst_row.chunks_exact_mut(PIXEL_SIZE).enumerate() {
        let mut ss = [0f64; PIXEL_SIZE];
        for (i, &w) in weights.iter().enumerate() {
            let src_x = (x as i64 + i as i64 - radius).clamp(0, max_x) as usize;
            let offset = src_x * PIXEL_SIZE;
            let src_pixel = &src_row[offset..offset + PIXEL_SIZE];
            for (s, &c) in ss.iter_mut().zip(src_pixel) {
                *s += c as f64 * w;
            }
        }
        for (d, s) in dst_pixel.iter_mut().zip(ss) {
            *d = clip_channel(s);
        }
    }
}
