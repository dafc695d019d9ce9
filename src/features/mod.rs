use crate::image::Image;
use self::keypoint::KeyPoint;

pub mod keypoint;
pub mod orientation;
pub mod harris_corner;
pub mod sift_feature;
pub mod reference_sift;

/// A sample location inside a scale space stack
pub trait Feature {
    fn get_x_image(&self) -> usize;
    fn get_y_image(&self) -> usize;
    fn get_closest_sigma_level(&self) -> usize;
}

/// Scale space keypoint detector. Input intensities are expected in [0,1]; keypoints are reported in the
/// coordinate frame of the input image.
pub trait Detector {
    fn name(&self) -> &str;
    fn detect(&self, image: &Image) -> Vec<KeyPoint>;
}

/// Keeps the `limit` keypoints with the largest response
pub fn strongest_keypoints(mut keypoints: Vec<KeyPoint>, limit: Option<usize>) -> Vec<KeyPoint> {
    if let Some(limit) = limit {
        if limit < keypoints.len() {
            keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));
            keypoints.truncate(limit);
        }
    }
    keypoints
}
