use std::ops::Range;

use crate::image::WindowMut;
use crate::{GaussianKernel, Image, RowWindow};

mod horizontal;
mod vertical;

/// Added to an accumulated value before truncation, so that sums
/// which should land exactly on an integer are not moved to the
/// previous integer by rounding errors of floating point arithmetic.
const ROUNDING_TOLERANCE: f64 = 1e-7;

/// Blurs the whole image in place.
pub fn blur_image(image: &mut Image, kernel: &GaussianKernel) {
    let rows = 0..image.height();
    convolve_image_rows(image, kernel, rows);
}

/// Blurs given rows of the image, reading other rows as neighbours.
pub(crate) fn convolve_image_rows(image: &mut Image, kernel: &GaussianKernel, rows: Range<u32>) {
    convolve(image.as_window_mut(), kernel, rows);
}

/// Blurs rows of the window with global indexes from `compute_rows`.
///
/// Only rows which have all their vertical neighbours (up to `radius`
/// rows in both directions, clamped to image edges) inside of
/// `compute_rows` get the same values as in the whole blurred image.
pub fn blur_window(window: &mut RowWindow, kernel: &GaussianKernel, compute_rows: Range<u32>) {
    convolve(window.as_window_mut(), kernel, compute_rows);
}

fn convolve(mut window: WindowMut, kernel: &GaussianKernel, compute_rows: Range<u32>) {
    let window_rows = window.row_range();
    let start = compute_rows.start.max(window_rows.start);
    let end = compute_rows.end.min(window_rows.end);
    if start >= end {
        return;
    }
    if kernel.radius() == 0 {
        // Single weight 1.0 leaves every pixel unchanged.
        return;
    }
    horizontal::horiz_convolution(&mut window, kernel, start..end);
    vertical::vert_convolution(&mut window, kernel, start..end);
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        /// Calls `f` with the global index and pixels of every row.
        fn process_rows<F>(rows: &mut [Vec<u8>], first_row: u32, f: F)
        where
            F: Fn(u32, &mut [u8]) + Send + Sync,
        {
            use rayon::prelude::*;
            rows.par_iter_mut()
                .enumerate()
                .for_each(|(i, row)| f(first_row + i as u32, row));
        }
    } else {
        /// Calls `f` with the global index and pixels of every row.
        fn process_rows<F>(rows: &mut [Vec<u8>], first_row: u32, f: F)
        where
            F: Fn(u32, &mut [u8]),
        {
            rows.iter_mut()
                .enumerate()
                .for_each(|(i, row)| f(first_row + i as u32, row));
        }
    }
}

#[inline(always)]
pub(crate) fn clip_channel(value: f64) -> u8 {
    // Cast truncates toward zero and saturates out-of-range values.
    (value + ROUNDING_TOLERANCE) as u8
}
