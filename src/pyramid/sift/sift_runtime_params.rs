use serde::{Serialize, Deserialize};
use crate::Float;
use std::fmt;

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct SiftRuntimeParams {
    /// Gaussian kernels are truncated at this many standard deviations
    pub blur_half_factor: Float,
    /// Blur assumed to be present in the input image
    pub sigma_in: Float,
    /// Blur of the first image of every octave, in pixels of that octave
    pub sigma_initial: Float,
    pub octave_count: usize,
    /// Scales per octave
    pub sigma_count: usize,
    pub contrast_r: Float,
    pub edge_r: Float,
    pub max_refinement_iterations: usize,
    pub border: usize,
    pub upsample: bool,
    pub features_limit: Option<usize>
}

impl Default for SiftRuntimeParams {
    fn default() -> SiftRuntimeParams {
        SiftRuntimeParams {
            blur_half_factor: 3.0,
            sigma_in: 0.5,
            sigma_initial: 1.6,
            octave_count: 4,
            sigma_count: 3,
            contrast_r: 0.03,
            edge_r: 10.0,
            max_refinement_iterations: 5,
            border: 5,
            upsample: true,
            features_limit: None
        }
    }
}

impl fmt::Display for SiftRuntimeParams {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "sigma_initial_{}_octave_count_{}_sigma_count_{}_contrast_r_{}_edge_r_{}_upsample_{}",
        self.sigma_initial,self.octave_count,self.sigma_count,self.contrast_r,self.edge_r,self.upsample)
    }
}
