extern crate nalgebra as na;

use na::Matrix2;
use crate::image::Image;
use crate::{Float, GradientDirection};
use crate::filter::{gradient_convolution_at_sample,prewitt_kernel::PrewittKernel,laplace_kernel::LaplaceKernel};
use crate::features::Feature;

/// Spatial hessian of a stack at the feature location. `x_gradients` are the precomputed horizontal
/// derivatives of `images`.
pub fn harris_matrix(images: &Vec<Image>,x_gradients: &Vec<Image>, input_params: &dyn Feature) -> Matrix2<Float> {

    let second_order_kernel = LaplaceKernel::new();
    let first_order_kernel = PrewittKernel::new();

    let dxx = gradient_convolution_at_sample(images,input_params,&second_order_kernel,GradientDirection::HORIZONTAL);
    let dyy = gradient_convolution_at_sample(images,input_params,&second_order_kernel,GradientDirection::VERTICAL);
    let dxy = gradient_convolution_at_sample(x_gradients,input_params,&first_order_kernel,GradientDirection::VERTICAL);

    Matrix2::new(dxx,dxy,
                dxy,dyy)

}

pub fn harris_ratio(harris_matrix: &Matrix2<Float>, r: Float) -> (Float,Float) {
    let trace = harris_matrix.trace();
    let determinant = harris_matrix.determinant();
    ( trace.powi(2)/determinant,(r+1.0).powi(2)/r)
}

/// True when the principal curvature ratio stays below `r`, i.e. the feature is not an edge
pub fn passes_edge_test(harris_matrix: &Matrix2<Float>, r: Float) -> bool {
    let determinant = harris_matrix.determinant();
    let (harris_ratio, r_ratio) = harris_ratio(harris_matrix, r);
    determinant > 0.0 && harris_ratio < r_ratio
}

pub fn edge_response_filter(images: &Vec<Image>,x_gradients: &Vec<Image>, input_params: &dyn Feature, r: Float) -> bool {
    let hessian = harris_matrix(images,x_gradients,input_params);
    passes_edge_test(&hessian, r)
}
