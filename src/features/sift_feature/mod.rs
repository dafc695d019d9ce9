extern crate nalgebra as na;

use na::DMatrix;

use crate::Float;
use crate::image::Image;
use crate::pyramid::sift::{build_sift_pyramid, keypoints_from_pyramid, sift_octave::SiftOctave, sift_runtime_params::SiftRuntimeParams};
use crate::features::{Feature, Detector, strongest_keypoints, keypoint::KeyPoint};
use std::fmt;

pub mod processing;

/// Location in the scale space of one octave. Coordinates are fractional after refinement.
#[derive(Debug,Clone,PartialEq)]
pub struct SiftFeature {
    pub x: Float,
    pub y: Float,
    pub sigma_level: Float
}

impl Feature for SiftFeature {
    fn get_x_image(&self) -> usize {
        self.x.round().max(0.0) as usize
    }
    fn get_y_image(&self) -> usize {
        self.y.round().max(0.0) as usize
    }
    fn get_closest_sigma_level(&self) -> usize {
        self.sigma_level.round().max(0.0) as usize
    }
}

impl fmt::Display for SiftFeature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "x: {}, y: {}, s: {}", self.x, self.y, self.sigma_level)
    }
}

/// The scale space detector of this crate: dog extrema on a pyramid built with our own separable gaussian,
/// refined with precomputed dog gradients.
#[derive(Debug,Clone,Default)]
pub struct SiftFeatureDetector {
    pub runtime_params: SiftRuntimeParams
}

impl SiftFeatureDetector {
    pub fn new(runtime_params: SiftRuntimeParams) -> SiftFeatureDetector {
        SiftFeatureDetector{runtime_params}
    }
}

impl Detector for SiftFeatureDetector {
    fn name(&self) -> &str {
        "sift_feature"
    }

    fn detect(&self, image: &Image) -> Vec<KeyPoint> {
        let pyramid = build_sift_pyramid(image, &self.runtime_params);
        strongest_keypoints(keypoints_from_pyramid(&pyramid, &self.runtime_params), self.runtime_params.features_limit)
    }
}

/// Samples of dog level `sigma_level` that are strictly smaller or strictly larger than all 26 neighbours
pub fn detect_sift_feature(source_octave: &SiftOctave, sigma_level: usize, x_step: usize, y_step: usize, runtime_params: &SiftRuntimeParams) -> Vec<SiftFeature> {

    let mut extrema_vec: Vec<SiftFeature> = Vec::new();

    assert!(sigma_level+1 < source_octave.difference_of_gaussians.len());
    assert!(sigma_level > 0);

    let image_buffer = &source_octave.difference_of_gaussians[sigma_level].buffer;
    let prev_buffer = &source_octave.difference_of_gaussians[sigma_level-1].buffer;
    let next_buffer = &source_octave.difference_of_gaussians[sigma_level+1].buffer;

    let offset = runtime_params.border.max(1);
    let pre_threshold = 0.5*runtime_params.contrast_r;

    if image_buffer.ncols() <= 2*offset || image_buffer.nrows() <= 2*offset {
        return extrema_vec;
    }

    for x in (offset..image_buffer.ncols()-offset).step_by(x_step) {
        for y in (offset..image_buffer.nrows()-offset).step_by(y_step)  {

            let sample_value = image_buffer[(y,x)];
            if sample_value.abs() < pre_threshold {
                continue;
            }

            let (is_smallest_curr, is_largest_curr) =  is_sample_extrema_in_neighbourhood(sample_value,x,y,image_buffer,true);
            let is_extrema = match (is_smallest_curr, is_largest_curr) {
                (false, false) => false,
                _ => {
                    let (is_smallest_prev, is_largest_prev) =  is_sample_extrema_in_neighbourhood(sample_value,x,y,prev_buffer,false);
                    let (is_smallest_next, is_largest_next) = is_sample_extrema_in_neighbourhood(sample_value,x,y,next_buffer,false);
                    (is_smallest_curr && is_smallest_prev && is_smallest_next) || (is_largest_curr && is_largest_prev && is_largest_next)
                }
            };

            if is_extrema {
                extrema_vec.push(SiftFeature{x: x as Float,y: y as Float,sigma_level: sigma_level as Float});
            }
        }
    }

    extrema_vec
}

/// (strictly smallest, strictly largest) compared to the 3x3 neighbourhood in `neighbourhood_buffer`
pub fn is_sample_extrema_in_neighbourhood(sample: Float, x_sample: usize, y_sample: usize, neighbourhood_buffer: &DMatrix<Float>, skip_center: bool) -> (bool,bool) {

    let mut is_smallest = true;
    let mut is_largest = true;

    for x in x_sample-1..x_sample+2 {
        for y in y_sample-1..y_sample+2 {

            if x == x_sample && y == y_sample && skip_center {
                continue;
            }

            let value = neighbourhood_buffer[(y,x)];
            is_smallest &= sample < value;
            is_largest &= sample > value;

            if !(is_smallest || is_largest) {
                return (false,false);
            }
        }
    }

    (is_smallest,is_largest)
}

/// Sub pixel refinement followed by contrast and edge rejection. Returns the interpolated contrast with every
/// surviving feature.
pub fn sift_feature_refinement(extrema: &Vec<SiftFeature>, source_octave: &SiftOctave, runtime_params: &SiftRuntimeParams) -> Vec<(Float,SiftFeature)> {
    extrema.iter()
        .filter_map(|x| processing::subpixel_refinement(source_octave, x, runtime_params))
        .filter(|x| x.0 >= runtime_params.contrast_r)
        .filter(|x| processing::reject_edge_response_filter(source_octave, &x.1, runtime_params.edge_r))
        .collect()
}
