use crate::{Float,float};
use float::consts::PI;
use super::kernel::Kernel;

/// Sampled 1D gaussian. The samples are rescaled to sum to one so that truncation does not darken the image.
pub struct GaussKernel1D {
    kernel: Vec<Float>,
    step: usize,
}

impl GaussKernel1D {
    fn sample(mean: Float, std: Float, x:Float) -> Float {
        let exponent = (-0.5*((x-mean)/std).powi(2)).exp();
        let factor = 1.0/(std*(2.0*PI).sqrt());
        factor*exponent
    }

    pub fn new(mean: Float, std: Float, step: usize, radius: Float) -> GaussKernel1D {
        assert!(std > 0.0);
        let radius_usize = radius.trunc() as usize;
        assert_eq!(radius_usize%step,0);

        let start = -(radius_usize as isize);
        let end_exclusive = (radius_usize as isize) + 1;
        let samples = (start..end_exclusive).step_by(step).map(|x| GaussKernel1D::sample(mean,std,x as Float)).collect::<Vec<Float>>();
        let sum: Float = samples.iter().sum();
        GaussKernel1D {
            kernel: samples.iter().map(|x| x/sum).collect(),
            step
        }
    }

    /// Kernel truncated at `blur_half_factor` standard deviations
    pub fn with_blur_half_factor(std: Float, blur_half_factor: Float) -> GaussKernel1D {
        GaussKernel1D::new(0.0, std, 1, generate_blur_half_width(blur_half_factor, std))
    }
}

pub fn generate_blur_half_width(blur_half_factor: Float, sigma: Float) -> Float {
    (blur_half_factor*sigma).ceil().max(1.0)
}

impl Kernel for GaussKernel1D {
    fn kernel(&self) -> &Vec<Float> {
        &self.kernel
    }

    fn step(&self) -> usize {
        self.step
    }

    fn normalizing_constant(&self) -> Float {
        1.0
    }
}
