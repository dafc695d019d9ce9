extern crate nalgebra as na;

use na::{Matrix3x1, Matrix3};
use crate::pyramid::sift::{sift_octave::SiftOctave, sift_runtime_params::SiftRuntimeParams};
use crate::{Float, GradientDirection};
use crate::filter::{gradient_convolution_at_sample,prewitt_kernel::PrewittKernel,laplace_kernel::LaplaceKernel};
use crate::features::{Feature,sift_feature::SiftFeature,harris_corner::edge_response_filter};

const MAX_OFFSET: Float = 0.5;

/// Fits a quadratic to the dog stack around the feature and moves the sample until the offset stays within half a
/// sample in every dimension. Returns the interpolated absolute dog value and the refined feature, or None if the
/// fit leaves the octave or does not converge.
pub fn subpixel_refinement(source_octave: &SiftOctave, input_params: &SiftFeature, runtime_params: &SiftRuntimeParams) -> Option<(Float,SiftFeature)> {

    let border = runtime_params.border.max(1);
    let mut x = input_params.get_x_image() as isize;
    let mut y = input_params.get_y_image() as isize;
    let mut sigma_level = input_params.get_closest_sigma_level() as isize;

    for _ in 0..runtime_params.max_refinement_iterations.max(1) {

        if x < 0 || y < 0 || sigma_level < 0 || !source_octave.within_range(x as usize, y as usize, sigma_level as usize, border) {
            return None;
        }

        let sample = SiftFeature{x: x as Float, y: y as Float, sigma_level: sigma_level as Float};
        let perturb = interpolate(source_octave, &sample)?;

        if perturb.iter().all(|v| v.abs() < MAX_OFFSET) {
            let (x_image, y_image, level) = (x as usize, y as usize, sigma_level as usize);
            let b = first_order_derivatives(source_octave, x_image, y_image, level);
            let dog_sample = source_octave.difference_of_gaussians[level].buffer[(y_image,x_image)];
            let contrast = (dog_sample + 0.5*b.dot(&perturb)).abs();
            let refined = SiftFeature{
                x: sample.x + perturb[(0,0)],
                y: sample.y + perturb[(1,0)],
                sigma_level: sample.sigma_level + perturb[(2,0)]
            };
            return Some((contrast, refined));
        }

        x += step_towards(perturb[(0,0)]);
        y += step_towards(perturb[(1,0)]);
        sigma_level += step_towards(perturb[(2,0)]);
    }

    None
}

fn step_towards(offset: Float) -> isize {
    match offset.abs() < MAX_OFFSET {
        true => 0,
        false => offset.round().max(-1.0).min(1.0) as isize
    }
}

fn first_order_derivatives(source_octave: &SiftOctave, x: usize, y: usize, sigma_level: usize) -> Matrix3x1<Float> {
    let dx = source_octave.dog_x_gradient[sigma_level].buffer[(y,x)];
    let dy = source_octave.dog_y_gradient[sigma_level].buffer[(y,x)];
    let ds = source_octave.dog_s_gradient[sigma_level].buffer[(y,x)];
    Matrix3x1::new(dx,dy,ds)
}

/// Offset of the quadratic extremum from the sample. None if the hessian is singular.
pub fn interpolate(source_octave: &SiftOctave, input_params: &dyn Feature) -> Option<Matrix3x1<Float>> {

    let first_order_kernel = PrewittKernel::new();
    let second_order_kernel = LaplaceKernel::new();

    let b = first_order_derivatives(source_octave, input_params.get_x_image(), input_params.get_y_image(), input_params.get_closest_sigma_level());

    let dxx = gradient_convolution_at_sample(&source_octave.difference_of_gaussians,input_params,&second_order_kernel,GradientDirection::HORIZONTAL);
    let dyy = gradient_convolution_at_sample(&source_octave.difference_of_gaussians,input_params,&second_order_kernel,GradientDirection::VERTICAL);
    let dss = gradient_convolution_at_sample(&source_octave.difference_of_gaussians,input_params,&second_order_kernel,GradientDirection::SIGMA);

    let dxy = gradient_convolution_at_sample(&source_octave.dog_x_gradient,input_params,&first_order_kernel,GradientDirection::VERTICAL);
    let dxs = gradient_convolution_at_sample(&source_octave.dog_x_gradient,input_params,&first_order_kernel,GradientDirection::SIGMA);
    let dys = gradient_convolution_at_sample(&source_octave.dog_y_gradient,input_params,&first_order_kernel,GradientDirection::SIGMA);

    let a = Matrix3::new(dxx,dxy,dxs,
                         dxy,dyy,dys,
                         dxs,dys,dss);

    (-a).qr().solve(&b)
}

/// True if the feature is not located on an edge
pub fn reject_edge_response_filter(source_octave: &SiftOctave, input_params: &SiftFeature, r: Float) -> bool {
    edge_response_filter(&source_octave.difference_of_gaussians, &source_octave.dog_x_gradient, input_params, r)
}
