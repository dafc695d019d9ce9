extern crate nalgebra as na;

use na::DMatrix;
use crate::{float,Float};
use crate::numerics::{gradient_and_orientation, quadratic_peak_offset, wrap_angle};

pub const ORIENTATION_HISTOGRAM_BINS: usize = 36;
/// Gaussian window of the histogram relative to the keypoint sigma
pub const LAMBDA_ORI: Float = 1.5;
/// Secondary peaks need at least this fraction of the maximum
pub const PEAK_RATIO: Float = 0.8;
const SMOOTHING_PASSES: usize = 6;

#[derive(Debug,Clone)]
pub struct OrientationHistogram {
    pub bin_range: Float,
    pub bins: Vec<Float>
}

impl OrientationHistogram {

    pub fn new(bin_len: usize) -> OrientationHistogram {
        assert!(bin_len > 2);
        OrientationHistogram{
            bin_range: 2.0*float::consts::PI/(bin_len as Float),
            bins: vec![0.0;bin_len]
        }
    }

    pub fn add_measurement(&mut self, magnitude: Float, orientation: Float, weight: Float) -> () {
        let index = self.radian_to_index(orientation);
        self.bins[index] += magnitude*weight;
    }

    pub fn radian_to_index(&self, orientation: Float) -> usize {
        ((wrap_angle(orientation)/self.bin_range).floor() as usize) % self.bins.len()
    }

    /// Circular box filter of width three, applied repeatedly
    pub fn smooth(&mut self, passes: usize) -> () {
        let len = self.bins.len();
        for _ in 0..passes {
            let previous = self.bins.clone();
            for i in 0..len {
                self.bins[i] = (previous[(i+len-1)%len] + previous[i] + previous[(i+1)%len])/3.0;
            }
        }
    }

    pub fn max(&self) -> Float {
        self.bins.iter().cloned().fold(0.0, Float::max)
    }

    /// Interpolated orientations of all local maxima reaching `ratio` of the global maximum, strongest first
    pub fn peaks(&self, ratio: Float) -> Vec<Float> {
        let len = self.bins.len();
        let max = self.max();
        if max <= 0.0 {
            return vec![];
        }

        let mut peaks = (0..len).filter_map(|k| {
            let l = self.bins[(k+len-1)%len];
            let c = self.bins[k];
            let r = self.bins[(k+1)%len];
            match c > l && c > r && c >= ratio*max {
                true => {
                    let offset = quadratic_peak_offset(l, c, r);
                    Some((c, wrap_angle((k as Float + 0.5 + offset)*self.bin_range)))
                },
                false => None
            }
        }).collect::<Vec<(Float,Float)>>();

        peaks.sort_by(|a, b| b.0.total_cmp(&a.0));
        peaks.into_iter().map(|(_, orientation)| orientation).collect()
    }
}

/// Gradient orientation histogram of a gaussian smoothed buffer around (x,y), weighted by a gaussian of
/// LAMBDA_ORI*sigma. Sigma is in pixels of the buffer.
pub fn orientation_histogram(buffer: &DMatrix<Float>, x: usize, y: usize, sigma: Float) -> OrientationHistogram {
    let mut histogram = OrientationHistogram::new(ORIENTATION_HISTOGRAM_BINS);
    let window_sigma = LAMBDA_ORI*sigma;
    let radius = (3.0*window_sigma).round() as isize;
    let width = buffer.ncols() as isize;
    let height = buffer.nrows() as isize;

    for dy in -radius..radius+1 {
        for dx in -radius..radius+1 {
            let sample_x = x as isize + dx;
            let sample_y = y as isize + dy;
            // Central differences need both neighbours
            if sample_x < 1 || sample_y < 1 || sample_x >= width-1 || sample_y >= height-1 {
                continue;
            }
            let (magnitude, orientation) = gradient_and_orientation(buffer, sample_x as usize, sample_y as usize);
            let weight = (-((dx*dx + dy*dy) as Float)/(2.0*window_sigma.powi(2))).exp();
            histogram.add_measurement(magnitude, orientation, weight);
        }
    }

    histogram.smooth(SMOOTHING_PASSES);
    histogram
}

pub fn dominant_orientations(buffer: &DMatrix<Float>, x: usize, y: usize, sigma: Float) -> Vec<Float> {
    orientation_histogram(buffer, x, y, sigma).peaks(PEAK_RATIO)
}
