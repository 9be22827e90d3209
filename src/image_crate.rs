use std::num::NonZeroU32;

use image::RgbaImage;

use crate::{Image, ImageBufferError};

impl TryFrom<RgbaImage> for Image {
    type Error = ImageBufferError;

    /// Fails only for images with zero width or height.
    fn try_from(src: RgbaImage) -> Result<Self, Self::Error> {
        let (width, height) = src.dimensions();
        match (NonZeroU32::new(width), NonZeroU32::new(height)) {
            (Some(width), Some(height)) => Image::from_vec_u8(width, height, src.into_raw()),
            _ => Err(ImageBufferError::InvalidBufferSize),
        }
    }
}

impl TryFrom<Image> for RgbaImage {
    type Error = ImageBufferError;

    fn try_from(src: Image) -> Result<Self, Self::Error> {
        let (width, height) = (src.width(), src.height());
        RgbaImage::from_raw(width, height, src.into_vec_u8())
            .ok_or(ImageBufferError::InvalidBufferSize)
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    #[test]
    fn conversion_keeps_pixels() {
        let mut src = RgbaImage::new(3, 2);
        src.put_pixel(2, 1, Rgba([10, 20, 30, 40]));
        let image = Image::try_from(src.clone()).unwrap();
        assert_eq!(image.get_pixel(2, 1), Some([10, 20, 30, 40]));
        assert_eq!(image.get_pixel(0, 0), Some([0, 0, 0, 0]));

        let back = RgbaImage::try_from(image).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn empty_image_is_rejected() {
        assert_eq!(
            Image::try_from(RgbaImage::new(0, 5)),
            Err(ImageBufferError::InvalidBufferSize)
        );
    }
}
