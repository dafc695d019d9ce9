use log::debug;

use crate::Float;
use crate::image::Image;
use crate::pyramid::Pyramid;
use crate::features::{Feature, keypoint::KeyPoint, orientation::dominant_orientations, sift_feature};
use self::{sift_octave::SiftOctave, sift_runtime_params::SiftRuntimeParams};

pub mod sift_runtime_params;
pub mod sift_octave;

pub type SiftPyramid = Pyramid<SiftOctave>;

/// Smallest side an octave may have
pub fn min_octave_dimension(runtime_params: &SiftRuntimeParams) -> usize {
    2*runtime_params.border.max(1) + 3
}

pub fn build_sift_pyramid(base_image: &Image, runtime_params: &SiftRuntimeParams) -> SiftPyramid {
    let mut octaves: Vec<SiftOctave> = Vec::with_capacity(runtime_params.octave_count);
    let min_dimension = min_octave_dimension(runtime_params);

    let (mut octave_image, mut base_blur) = match runtime_params.upsample {
        true => (Image::upsample_double(base_image), 2.0*runtime_params.sigma_in),
        false => (base_image.clone(), runtime_params.sigma_in)
    };

    let sigma_count = runtime_params.sigma_count;

    for i in 0..runtime_params.octave_count {

        if i > 0 {
            // Image s has twice the initial blur; halving the resolution brings it back to sigma_initial
            octave_image = match Image::downsample_half(&octaves[i-1].images[sigma_count], (min_dimension,min_dimension)) {
                Some(image) => image,
                None => break
            };
            base_blur = runtime_params.sigma_initial;
        } else if octave_image.width() < min_dimension || octave_image.height() < min_dimension {
            break;
        }

        let new_octave = SiftOctave::build_octave(&octave_image, base_blur, runtime_params);
        octaves.push(new_octave);
    }

    debug!("built sift pyramid with {} octaves", octaves.len());

    Pyramid{octaves}
}

/// Distance between two pixels of an octave, measured in pixels of the input image
pub fn pixel_distance(octave_level: usize, runtime_params: &SiftRuntimeParams) -> Float {
    let factor = (octave_level as Float).exp2();
    match runtime_params.upsample {
        true => 0.5*factor,
        false => factor
    }
}

pub fn keypoints_from_pyramid(pyramid: &SiftPyramid, runtime_params:&SiftRuntimeParams) -> Vec<KeyPoint> {

    let mut all_vectors = Vec::<Vec<KeyPoint>>::new();

    for octave_level in 0..pyramid.octaves.len() {
        all_vectors.push(keypoints_from_octave(pyramid, octave_level,runtime_params));
    }

    all_vectors.into_iter().flatten().collect()

}

pub fn keypoints_from_octave(pyramid: &SiftPyramid, octave_level: usize, runtime_params: &SiftRuntimeParams) -> Vec<KeyPoint> {
    let mut all_vectors = Vec::<Vec<KeyPoint>>::new();

    for dog_level in 1..pyramid.octaves[octave_level].s()+1 {
        all_vectors.push(keypoints_from_sigma(pyramid, octave_level,dog_level, runtime_params));
    }

    all_vectors.into_iter().flatten().collect()
}

pub fn keypoints_from_sigma(pyramid: &SiftPyramid, octave_level: usize, dog_level: usize, runtime_params: &SiftRuntimeParams) -> Vec<KeyPoint> {
    let x_step = 1;
    let y_step = 1;

    let octave = &pyramid.octaves[octave_level];
    let distance = pixel_distance(octave_level, runtime_params);

    let features = sift_feature::detect_sift_feature(octave,dog_level,x_step, y_step, runtime_params);
    let refined_features = sift_feature::sift_feature_refinement(&features, octave, runtime_params);

    debug!("octave {} dog level {}: {} extrema, {} refined", octave_level, dog_level, features.len(), refined_features.len());

    refined_features.iter().map(|(contrast, feature)| {
        let sigma = octave.sigma_at(feature.sigma_level);
        let gaussian_level = feature.get_closest_sigma_level().min(octave.images.len()-1);
        let orientation = dominant_orientations(&octave.images[gaussian_level].buffer, feature.get_x_image(), feature.get_y_image(), sigma)
            .first().cloned().unwrap_or(0.0);
        KeyPoint {
            x: feature.x*distance,
            y: feature.y*distance,
            scale: sigma*distance,
            orientation,
            response: *contrast
        }
    }).collect()
}
