use std::num::NonZeroU32;
use std::ops::Range;

use crate::{BlurError, ImageBufferError, ImageRowsError};

/// Count of bytes in one RGBA pixel.
pub const PIXEL_SIZE: usize = 4;

/// RGBA8 image stored as a sequence of independently owned rows.
///
/// Every row contains exactly `width * 4` bytes (R, G, B, A).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: NonZeroU32,
    height: NonZeroU32,
    rows: Vec<Vec<u8>>,
}

impl Image {
    /// Create a transparent black image with given dimensions.
    pub fn new(width: NonZeroU32, height: NonZeroU32) -> Self {
        let row_size = width.get() as usize * PIXEL_SIZE;
        Self {
            width,
            height,
            rows: vec![vec![0; row_size]; height.get() as usize],
        }
    }

    /// Create an image from rows received from a decoder.
    pub fn from_rows(
        width: NonZeroU32,
        height: NonZeroU32,
        rows: Vec<Vec<u8>>,
    ) -> Result<Self, ImageRowsError> {
        check_rows_count_and_size(width, height, &rows)?;
        Ok(Self {
            width,
            height,
            rows,
        })
    }

    /// Create an image from a row-major buffer with pixels data.
    pub fn from_vec_u8(
        width: NonZeroU32,
        height: NonZeroU32,
        buffer: Vec<u8>,
    ) -> Result<Self, ImageBufferError> {
        let row_size = width.get() as usize * PIXEL_SIZE;
        if buffer.len() != row_size * height.get() as usize {
            return Err(ImageBufferError::InvalidBufferSize);
        }
        let rows = buffer.chunks_exact(row_size).map(|row| row.to_vec()).collect();
        Ok(Self {
            width,
            height,
            rows,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height.get()
    }

    #[inline]
    pub(crate) fn dimensions(&self) -> (NonZeroU32, NonZeroU32) {
        (self.width, self.height)
    }

    /// Size of one row in bytes.
    #[inline]
    pub fn row_size(&self) -> usize {
        self.width.get() as usize * PIXEL_SIZE
    }

    #[inline]
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    #[inline]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        self.rows.get(y as usize).map(|row| row.as_slice())
    }

    #[inline]
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        self.rows.get_mut(y as usize).map(|row| row.as_mut_slice())
    }

    /// Returns `[R, G, B, A]` components of the pixel.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let start = x as usize * PIXEL_SIZE;
        let pixel = self.row(y)?.get(start..start + PIXEL_SIZE)?;
        Some([pixel[0], pixel[1], pixel[2], pixel[3]])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: [u8; 4]) -> bool {
        let start = x as usize * PIXEL_SIZE;
        match self
            .row_mut(y)
            .and_then(|row| row.get_mut(start..start + PIXEL_SIZE))
        {
            Some(dst) => {
                dst.copy_from_slice(&pixel);
                true
            }
            None => false,
        }
    }

    /// Row-major copy of all pixels data.
    pub fn buffer(&self) -> Vec<u8> {
        self.rows.concat()
    }

    pub fn into_vec_u8(self) -> Vec<u8> {
        self.rows.concat()
    }

    pub fn into_rows(self) -> Vec<Vec<u8>> {
        self.rows
    }

    /// A private copy of the whole image whose allocation failure
    /// is reported instead of aborting the process.
    pub(crate) fn try_clone(&self) -> Result<Self, BlurError> {
        let rows = try_copy_rows(&self.rows, self.row_size())?;
        Ok(Self {
            width: self.width,
            height: self.height,
            rows,
        })
    }

    pub(crate) fn as_window_mut(&mut self) -> WindowMut<'_> {
        WindowMut {
            image_height: self.height.get(),
            first_row: 0,
            rows: &mut self.rows,
        }
    }

    /// Replaces rows starting from `first_row` by the given ones.
    pub(crate) fn write_rows(
        &mut self,
        first_row: u32,
        rows: Vec<Vec<u8>>,
    ) -> Result<(), ImageRowsError> {
        let row_size = self.row_size();
        let start = first_row as usize;
        let dst_rows = self
            .rows
            .get_mut(start..start + rows.len())
            .ok_or(ImageRowsError::InvalidRowsCount)?;
        if rows.iter().any(|row| row.len() != row_size) {
            return Err(ImageRowsError::InvalidRowSize);
        }
        for (dst, src) in dst_rows.iter_mut().zip(rows) {
            *dst = src;
        }
        Ok(())
    }
}

/// Contiguous run of rows of an image, starting from `first_row`.
///
/// A worker that receives only the rows it needs keeps them in a window.
/// The height of the whole image is kept to clamp samples against
/// the real image edges rather than the edges of the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWindow {
    width: NonZeroU32,
    image_height: NonZeroU32,
    first_row: u32,
    rows: Vec<Vec<u8>>,
}

impl RowWindow {
    pub fn new(
        width: NonZeroU32,
        image_height: NonZeroU32,
        first_row: u32,
        rows: Vec<Vec<u8>>,
    ) -> Result<Self, ImageRowsError> {
        let end_row = first_row as usize + rows.len();
        if end_row > image_height.get() as usize {
            return Err(ImageRowsError::InvalidRowsCount);
        }
        let row_size = width.get() as usize * PIXEL_SIZE;
        if rows.iter().any(|row| row.len() != row_size) {
            return Err(ImageRowsError::InvalidRowSize);
        }
        Ok(Self {
            width,
            image_height,
            first_row,
            rows,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    #[inline]
    pub fn image_height(&self) -> u32 {
        self.image_height.get()
    }

    #[inline]
    pub fn first_row(&self) -> u32 {
        self.first_row
    }

    /// Global indexes of rows held by the window.
    #[inline]
    pub fn row_range(&self) -> Range<u32> {
        self.first_row..self.first_row + self.rows.len() as u32
    }

    /// Row by its global index.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        let local = y.checked_sub(self.first_row)?;
        self.rows.get(local as usize).map(|row| row.as_slice())
    }

    /// Takes rows with given global indexes out of the window.
    pub fn take_rows(&mut self, range: Range<u32>) -> Option<Vec<Vec<u8>>> {
        let start = range.start.checked_sub(self.first_row)? as usize;
        let end = range.end.checked_sub(self.first_row)? as usize;
        let rows = self.rows.get_mut(start..end)?;
        Some(rows.iter_mut().map(std::mem::take).collect())
    }

    pub(crate) fn as_window_mut(&mut self) -> WindowMut<'_> {
        WindowMut {
            image_height: self.image_height.get(),
            first_row: self.first_row,
            rows: &mut self.rows,
        }
    }
}

/// Mutable view used by the convolution passes.
pub(crate) struct WindowMut<'a> {
    pub image_height: u32,
    pub first_row: u32,
    pub rows: &'a mut [Vec<u8>],
}

impl WindowMut<'_> {
    #[inline]
    pub fn row_range(&self) -> Range<u32> {
        self.first_row..self.first_row + self.rows.len() as u32
    }
}

pub(crate) fn try_copy_rows(rows: &[Vec<u8>], row_size: usize) -> Result<Vec<Vec<u8>>, BlurError> {
    let mut res: Vec<Vec<u8>> = Vec::new();
    res.try_reserve_exact(rows.len())
        .map_err(|_| BlurError::AllocationFailure {
            bytes: rows.len() * row_size,
        })?;
    for row in rows {
        let mut copy = Vec::new();
        copy.try_reserve_exact(row.len())
            .map_err(|_| BlurError::AllocationFailure {
                bytes: rows.len() * row_size,
            })?;
        copy.extend_from_slice(row);
        res.push(copy);
    }
    Ok(res)
}

fn check_rows_count_and_size(
    width: NonZeroU32,
    height: NonZeroU32,
    rows: &[Vec<u8>],
) -> Result<(), ImageRowsError> {
    if rows.len() != height.get() as usize {
        return Err(ImageRowsError::InvalidRowsCount);
    }
    let row_size = width.get() as usize * PIXEL_SIZE;
    if rows.iter().any(|row| row.len() != row_size) {
        return Err(ImageRowsError::InvalidRowSize);
    }
    Ok(())
}
