extern crate nalgebra as na;

use log::debug;
use na::{Matrix2, Matrix3, Vector3};

use crate::Float;
use crate::image::{Image, image_encoding::ImageEncoding};
use crate::filter::{gaussian_2_d_convolution, gauss_kernel::GaussKernel1D};
use crate::features::{Detector, strongest_keypoints, keypoint::KeyPoint, orientation::dominant_orientations};
use crate::features::harris_corner::passes_edge_test;
use crate::features::sift_feature::is_sample_extrema_in_neighbourhood;
use self::reference_sift_params::ReferenceSiftParams;

pub mod reference_sift_params;

/// Pixel distance of the seed image relative to the input
pub const DELTA_MIN: Float = 0.5;
/// Shortest side the smallest octave may have
const MIN_OCTAVE_SIDE: Float = 12.0;
const MAX_OFFSET: Float = 0.5;

/// SIFT as formulated in "Anatomy of the SIFT Method" (Rey-Otero, Delbracio). Serves as the baseline the
/// custom detector is compared against.
#[derive(Debug,Clone,Default)]
pub struct ReferenceSiftDetector {
    pub params: ReferenceSiftParams
}

impl ReferenceSiftDetector {
    pub fn new(params: ReferenceSiftParams) -> ReferenceSiftDetector {
        ReferenceSiftDetector{params}
    }
}

impl Detector for ReferenceSiftDetector {
    fn name(&self) -> &str {
        "reference_sift"
    }

    fn detect(&self, image: &Image) -> Vec<KeyPoint> {
        let octaves = build_scale_space(image, &self.params);
        strongest_keypoints(find_keypoints(&octaves, &self.params), self.params.features_limit)
    }
}

#[derive(Debug,Clone)]
pub struct ReferenceOctave {
    /// n+3 gaussian images
    pub images: Vec<Image>,
    /// n+2 differences of consecutive images
    pub difference_of_gaussians: Vec<Image>,
    /// Distance between two pixels of this octave in input pixels
    pub pixel_distance: Float
}

#[derive(Debug,Clone,Copy,PartialEq)]
struct ScaleSpacePoint {
    x: usize,
    y: usize,
    scale: usize
}

#[derive(Debug,Clone,Copy)]
struct InterpolatedExtremum {
    point: ScaleSpacePoint,
    /// (x, y, scale)
    offset: Vector3<Float>,
    contrast: Float
}

/// floor(log2(min(w,h)/(12*delta_min))) + 1, so that the last octave keeps at least 12 pixels along its
/// shorter side. Zero if even the seed image is smaller than that.
pub fn octave_count(width: usize, height: usize, params: &ReferenceSiftParams) -> usize {
    let ratio = (width.min(height) as Float)/(MIN_OCTAVE_SIDE*DELTA_MIN);
    let count = match ratio >= 1.0 {
        true => (ratio.log2().floor() as usize) + 1,
        false => 0
    };
    match params.max_octaves {
        Some(max) => count.min(max),
        None => count
    }
}

fn blur(image: &Image, sigma: Float, params: &ReferenceSiftParams) -> Image {
    gaussian_2_d_convolution(image, &GaussKernel1D::with_blur_half_factor(sigma, params.blur_half_factor))
}

/// Input upsampled by 1/DELTA_MIN and blurred from sigma_in to sigma_min
pub fn seed_image(image: &Image, params: &ReferenceSiftParams) -> Image {
    let upsampled = Image::upsample_double(image);
    let sigma = (params.sigma_min.powi(2) - params.sigma_in.powi(2)).max(0.0).sqrt()/DELTA_MIN;
    match sigma > 0.0 {
        true => blur(&upsampled, sigma, params),
        false => upsampled
    }
}

/// Blur that takes scale s-1 of an octave to scale s, in pixels of that octave
pub fn incremental_sigma(s: usize, params: &ReferenceSiftParams) -> Float {
    let n = params.scales_per_octave as Float;
    let s = s as Float;
    (params.sigma_min/DELTA_MIN)*((2.0*s/n).exp2() - (2.0*(s-1.0)/n).exp2()).sqrt()
}

pub fn build_scale_space(image: &Image, params: &ReferenceSiftParams) -> Vec<ReferenceOctave> {
    let n = params.scales_per_octave;
    assert!(n > 0);
    let min_dimension = 2*params.image_border.max(1) + 3;
    let count = octave_count(image.width(), image.height(), params);
    let increments = (1..n+3).map(|s| incremental_sigma(s, params)).collect::<Vec<Float>>();

    let mut octaves: Vec<ReferenceOctave> = Vec::with_capacity(count);
    for o in 0..count {
        let first = match o {
            0 => seed_image(image, params),
            _ => match Image::downsample_half(&octaves[o-1].images[n], (min_dimension,min_dimension)) {
                Some(image) => image,
                None => break
            }
        };
        if first.width() < min_dimension || first.height() < min_dimension {
            break;
        }

        let mut images = Vec::with_capacity(n+3);
        images.push(first);
        for sigma in increments.iter() {
            let next = blur(&images[images.len()-1], *sigma, params);
            images.push(next);
        }

        let difference_of_gaussians = images.windows(2)
            .map(|pair| Image::from_matrix(&(&pair[1].buffer - &pair[0].buffer), ImageEncoding::F64, false))
            .collect::<Vec<Image>>();

        octaves.push(ReferenceOctave{
            images,
            difference_of_gaussians,
            pixel_distance: DELTA_MIN*(o as Float).exp2()
        });
    }

    debug!("built reference scale space with {} octaves", octaves.len());
    octaves
}

pub fn find_keypoints(octaves: &Vec<ReferenceOctave>, params: &ReferenceSiftParams) -> Vec<KeyPoint> {
    let n = params.scales_per_octave;
    let mut keypoints = Vec::<KeyPoint>::new();

    for (o, octave) in octaves.iter().enumerate() {
        for s in 1..n+1 {
            let candidates = local_extrema(&octave.difference_of_gaussians, s, params);
            let before = keypoints.len();
            for candidate in candidates {
                let extremum = match interpolate_extremum(&octave.difference_of_gaussians, candidate, params) {
                    Some(extremum) => extremum,
                    None => continue
                };
                if extremum.contrast*(n as Float) <= params.contrast_threshold {
                    continue;
                }
                let point = extremum.point;
                if !passes_edge_test(&spatial_hessian(&octave.difference_of_gaussians[point.scale], point.x, point.y), params.edge_threshold) {
                    continue;
                }

                let scale_level = point.scale as Float + extremum.offset[2];
                let sigma_octave = (params.sigma_min/DELTA_MIN)*(scale_level/(n as Float)).exp2();
                let mut orientations = dominant_orientations(&octave.images[point.scale].buffer, point.x, point.y, sigma_octave);
                if orientations.is_empty() {
                    orientations.push(0.0);
                }

                for orientation in orientations {
                    keypoints.push(KeyPoint {
                        x: (point.x as Float + extremum.offset[0])*octave.pixel_distance,
                        y: (point.y as Float + extremum.offset[1])*octave.pixel_distance,
                        scale: sigma_octave*octave.pixel_distance,
                        orientation,
                        response: extremum.contrast
                    });
                }
            }
            debug!("octave {} scale {}: {} keypoints", o, s, keypoints.len() - before);
        }
    }

    keypoints
}

fn local_extrema(dogs: &Vec<Image>, s: usize, params: &ReferenceSiftParams) -> Vec<ScaleSpacePoint> {
    let buffer = &dogs[s].buffer;
    let border = params.image_border.max(1);
    let threshold = 0.5*params.contrast_threshold/(params.scales_per_octave as Float);
    let mut extrema = Vec::<ScaleSpacePoint>::new();

    if buffer.ncols() <= 2*border || buffer.nrows() <= 2*border {
        return extrema;
    }

    for y in border..buffer.nrows()-border {
        for x in border..buffer.ncols()-border {
            let value = buffer[(y,x)];
            if value.abs() <= threshold {
                continue;
            }
            let (smallest, largest) = is_sample_extrema_in_neighbourhood(value, x, y, buffer, true);
            if !(smallest || largest) {
                continue;
            }
            let (smallest_prev, largest_prev) = is_sample_extrema_in_neighbourhood(value, x, y, &dogs[s-1].buffer, false);
            let (smallest_next, largest_next) = is_sample_extrema_in_neighbourhood(value, x, y, &dogs[s+1].buffer, false);
            if (smallest && smallest_prev && smallest_next) || (largest && largest_prev && largest_next) {
                extrema.push(ScaleSpacePoint{x, y, scale: s});
            }
        }
    }

    extrema
}

/// Gradient (x, y, scale) and 3x3 hessian of the dog stack by central differences
fn derivatives(dogs: &Vec<Image>, point: &ScaleSpacePoint) -> (Vector3<Float>, Matrix3<Float>) {
    let (x, y) = (point.x, point.y);
    let prev = &dogs[point.scale-1].buffer;
    let curr = &dogs[point.scale].buffer;
    let next = &dogs[point.scale+1].buffer;

    let gradient = Vector3::new(
        (curr[(y,x+1)] - curr[(y,x-1)])/2.0,
        (curr[(y+1,x)] - curr[(y-1,x)])/2.0,
        (next[(y,x)] - prev[(y,x)])/2.0
    );

    let center = 2.0*curr[(y,x)];
    let dxx = curr[(y,x+1)] + curr[(y,x-1)] - center;
    let dyy = curr[(y+1,x)] + curr[(y-1,x)] - center;
    let dss = next[(y,x)] + prev[(y,x)] - center;
    let dxy = (curr[(y+1,x+1)] - curr[(y+1,x-1)] - curr[(y-1,x+1)] + curr[(y-1,x-1)])/4.0;
    let dxs = (next[(y,x+1)] - next[(y,x-1)] - prev[(y,x+1)] + prev[(y,x-1)])/4.0;
    let dys = (next[(y+1,x)] - next[(y-1,x)] - prev[(y+1,x)] + prev[(y-1,x)])/4.0;

    let hessian = Matrix3::new(dxx,dxy,dxs,
                               dxy,dyy,dys,
                               dxs,dys,dss);

    (gradient, hessian)
}

fn interpolate_extremum(dogs: &Vec<Image>, start: ScaleSpacePoint, params: &ReferenceSiftParams) -> Option<InterpolatedExtremum> {
    let n = params.scales_per_octave as isize;
    let border = params.image_border.max(1) as isize;
    let width = dogs[0].width() as isize;
    let height = dogs[0].height() as isize;
    let mut point = start;

    for _ in 0..params.max_interpolation_steps.max(1) {
        let (gradient, hessian) = derivatives(dogs, &point);
        let offset = (-hessian).qr().solve(&gradient)?;

        if offset.iter().all(|v| v.abs() < MAX_OFFSET) {
            let value = dogs[point.scale].buffer[(point.y,point.x)];
            let contrast = (value + 0.5*gradient.dot(&offset)).abs();
            return Some(InterpolatedExtremum{point, offset, contrast});
        }

        let x = point.x as isize + offset[0].round() as isize;
        let y = point.y as isize + offset[1].round() as isize;
        let scale = point.scale as isize + offset[2].round() as isize;

        if scale < 1 || scale > n || x < border || x >= width - border || y < border || y >= height - border {
            return None;
        }
        point = ScaleSpacePoint{x: x as usize, y: y as usize, scale: scale as usize};
    }

    None
}

fn spatial_hessian(dog: &Image, x: usize, y: usize) -> Matrix2<Float> {
    let buffer = &dog.buffer;
    let center = 2.0*buffer[(y,x)];
    let dxx = buffer[(y,x+1)] + buffer[(y,x-1)] - center;
    let dyy = buffer[(y+1,x)] + buffer[(y-1,x)] - center;
    let dxy = (buffer[(y+1,x+1)] - buffer[(y+1,x-1)] - buffer[(y-1,x+1)] + buffer[(y-1,x-1)])/4.0;
    Matrix2::new(dxx,dxy,
                 dxy,dyy)
}
