//! 8x8 average-hash perceptual hashing for semantic cache keys.

use image::{imageops::FilterType, GrayImage, RgbImage};

const HASH_SIZE: u32 = 8;

/// A raw RGB8 pixel crop, packed row-major with no padding.
#[derive(Debug, Clone)]
pub struct Crop {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl Crop {
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> Self {
        Self { width, height, rgb }
    }
}

/// 8x8 average hash, hex-encoded to 16 characters.
///
/// Downscales to `HASH_SIZE x HASH_SIZE` grayscale, compares each pixel to
/// the mean, and packs the resulting 64 bits into hex. Degenerate (empty or
/// malformed) crops hash to all-zero.
pub fn average_hash(crop: &Crop) -> String {
    let Some(image) = RgbImage::from_raw(crop.width, crop.height, crop.rgb.clone()) else {
        return "0".repeat(16);
    };
    let gray: GrayImage = image::DynamicImage::ImageRgb8(image).into_luma8();
    let small = image::imageops::resize(&gray, HASH_SIZE, HASH_SIZE, FilterType::Triangle);

    let pixels: Vec<u8> = small.pixels().map(|p| p.0[0]).collect();
    let mean = pixels.iter().map(|&p| p as u64).sum::<u64>() / pixels.len() as u64;

    let mut bits: u64 = 0;
    for (i, &p) in pixels.iter().enumerate() {
        if p as u64 >= mean {
            bits |= 1 << i;
        }
    }
    format!("{bits:016x}")
}
