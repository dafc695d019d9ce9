use serde::{Serialize, Deserialize};
use crate::Float;
use std::fmt;

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct ReferenceSiftParams {
    /// Blur of the seed image, in pixels of the input image
    pub sigma_min: Float,
    /// Blur assumed to be present in the input image
    pub sigma_in: Float,
    pub scales_per_octave: usize,
    /// Compared against the interpolated dog value times scales_per_octave
    pub contrast_threshold: Float,
    pub edge_threshold: Float,
    pub max_interpolation_steps: usize,
    pub image_border: usize,
    pub blur_half_factor: Float,
    pub max_octaves: Option<usize>,
    pub features_limit: Option<usize>
}

impl Default for ReferenceSiftParams {
    fn default() -> ReferenceSiftParams {
        ReferenceSiftParams {
            sigma_min: 0.8,
            sigma_in: 0.5,
            scales_per_octave: 3,
            contrast_threshold: 0.04,
            edge_threshold: 10.0,
            max_interpolation_steps: 5,
            image_border: 5,
            blur_half_factor: 4.0,
            max_octaves: None,
            features_limit: None
        }
    }
}

impl fmt::Display for ReferenceSiftParams {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "sigma_min_{}_scales_{}_contrast_{}_edge_{}", self.sigma_min, self.scales_per_octave, self.contrast_threshold, self.edge_threshold)
    }
}
