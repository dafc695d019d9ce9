#![allow(dead_code)]

use nalgebra::DMatrix;
use rand::{Rng, SeedableRng, rngs::StdRng};

use keypoint_robustness::Float;
use keypoint_robustness::image::{Image, image_encoding::ImageEncoding};

/// Sum of isotropic gaussian blobs (x, y, sigma, amplitude) on a zero background
pub fn gaussian_blob_image(width: usize, height: usize, blobs: &[(Float,Float,Float,Float)]) -> Image {
    let buffer = DMatrix::<Float>::from_fn(height, width, |y, x| {
        blobs.iter().map(|&(bx, by, sigma, amplitude)| {
            let r2 = (x as Float - bx).powi(2) + (y as Float - by).powi(2);
            amplitude*(-r2/(2.0*sigma*sigma)).exp()
        }).sum()
    });
    Image::from_matrix(&buffer, ImageEncoding::F64, false)
}

pub fn random_image(width: usize, height: usize, seed: u64) -> Image {
    let mut rng = StdRng::seed_from_u64(seed);
    let buffer = DMatrix::<Float>::from_fn(height, width, |_, _| rng.gen_range(0.0..255.0));
    Image::from_matrix(&buffer, ImageEncoding::U8, false)
}
