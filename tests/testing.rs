#![allow(dead_code)]
use std::num::NonZeroU32;

use band_blur::{Image, PIXEL_SIZE};
use image::RgbaImage;

pub fn non_zero_u32(v: u32) -> NonZeroU32 {
    NonZeroU32::new(v).unwrap()
}

/// Sums of every channel over all pixels.
pub fn image_checksum(image: &Image) -> [u64; 4] {
    let mut res = [0u64; 4];
    for row in image.rows() {
        for pixel in row.chunks_exact(PIXEL_SIZE) {
            res.iter_mut().zip(pixel).for_each(|(d, &s)| *d += s as u64);
        }
    }
    res
}

pub fn solid_image(width: u32, height: u32, pixel: [u8; 4]) -> Image {
    let buffer = pixel.repeat((width * height) as usize);
    Image::from_vec_u8(non_zero_u32(width), non_zero_u32(height), buffer).unwrap()
}

/// Image with pseudo-random pixels, the same for the same arguments.
pub fn noisy_image(width: u32, height: u32, seed: u32) -> Image {
    let mut state = seed | 1;
    let buffer = (0..width * height * PIXEL_SIZE as u32)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    Image::from_vec_u8(non_zero_u32(width), non_zero_u32(height), buffer).unwrap()
}

/// Saves the image into `./data/result/` if `SAVE_RESULT` env variable is set.
pub fn save_result(image: &Image, name: &str) {
    if std::env::var("SAVE_RESULT")
        .unwrap_or_else(|_| "".to_owned())
        .is_empty()
    {
        return;
    }
    std::fs::create_dir_all("./data/result").unwrap();
    let path = format!("./data/result/{name}.png");
    let image = RgbaImage::try_from(image.clone()).unwrap();
    image.save(path).unwrap();
}
