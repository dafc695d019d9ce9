extern crate nalgebra as na;

use na::Matrix2;
use crate::{Float,float};

pub fn round(number: Float, dp: i32) -> Float {
    let n = (10.0 as Float).powi(dp);
    (number * n).round()/n
}

pub fn rotation_matrix_2d_from_orientation(orientation: Float) -> Matrix2<Float> {
    Matrix2::new(orientation.cos(), -orientation.sin(),
                orientation.sin(), orientation.cos())
}

/// Maps an angle into [0, 2π)
pub fn wrap_angle(angle: Float) -> Float {
    let two_pi = 2.0*float::consts::PI;
    match angle.rem_euclid(two_pi) {
        a if a >= two_pi => 0.0,
        a => a
    }
}

/// Smallest absolute difference of two angles, in [0, π]
pub fn angular_difference(a: Float, b: Float) -> Float {
    let diff = wrap_angle(a - b);
    diff.min(2.0*float::consts::PI - diff)
}

/// Central difference gradient magnitude and orientation at an interior pixel. Orientation is in pixel
/// coordinates (y pointing down) and lies in [0, 2π).
pub fn gradient_and_orientation(buffer: &na::DMatrix<Float>, x: usize, y: usize) -> (Float,Float) {
    let x_diff = round((buffer[(y,x+1)] - buffer[(y,x-1)])/2.0, 12);
    let y_diff = round((buffer[(y+1,x)] - buffer[(y-1,x)])/2.0, 12);

    let gradient = (x_diff.powi(2) + y_diff.powi(2)).sqrt();
    let orientation = wrap_angle(y_diff.atan2(x_diff));

    (gradient,orientation)
}

/// Percentile `p` in [0,100] of already sorted data, linearly interpolated between order statistics.
pub fn percentile(sorted_data: &[Float], p: Float) -> Float {
    assert!(!sorted_data.is_empty());
    assert!((0.0..=100.0).contains(&p));
    let rank = p/100.0*((sorted_data.len() - 1) as Float);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let t = rank - lower as Float;
    (1.0-t)*sorted_data[lower] + t*sorted_data[upper]
}

pub fn mean_and_std(data: &[Float]) -> (Float,Float) {
    assert!(!data.is_empty());
    let n = data.len() as Float;
    let mean = data.iter().sum::<Float>()/n;
    let variance = data.iter().map(|x| (x-mean).powi(2)).sum::<Float>()/n;
    (mean, variance.sqrt())
}

/// Vertex of the parabola through (-1,l), (0,c), (1,r) relative to the center sample
pub fn quadratic_peak_offset(l: Float, c: Float, r: Float) -> Float {
    let denominator = l - 2.0*c + r;
    match denominator {
        d if d.abs() < float::EPSILON => 0.0,
        d => 0.5*(l - r)/d
    }
}
