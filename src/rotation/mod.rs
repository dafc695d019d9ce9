extern crate nalgebra as na;

use na::{DMatrix, Point2, Rotation2};
use serde::{Serialize, Deserialize};

use crate::Float;
use crate::image::Image;
use crate::features::keypoint::KeyPoint;
use crate::numerics::wrap_angle;

pub mod volume_rotation;

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum Interpolation {
    Nearest,
    /// Bilinear for images, trilinear for volumes
    Bilinear
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum Extent {
    /// Output keeps the input extents
    Crop,
    /// Output is the bounding box of the rotated input
    Expand
}

/// Rigid rotation in pixel coordinates (x right, y down): p -> R(angle)(p - source_center) + target_center.
/// Positive angles appear clockwise on screen.
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct RotationTransform2D {
    angle: Float,
    rotation: Rotation2<Float>,
    source_center: Point2<Float>,
    target_center: Point2<Float>
}

impl RotationTransform2D {
    pub fn new(angle: Float, source_center: Point2<Float>, target_center: Point2<Float>) -> RotationTransform2D {
        RotationTransform2D {angle, rotation: Rotation2::new(angle), source_center, target_center}
    }

    pub fn about_center(angle: Float, center: Point2<Float>) -> RotationTransform2D {
        RotationTransform2D::new(angle, center, center)
    }

    pub fn angle(&self) -> Float {
        self.angle
    }

    pub fn source_center(&self) -> &Point2<Float> {
        &self.source_center
    }

    pub fn target_center(&self) -> &Point2<Float> {
        &self.target_center
    }

    pub fn apply(&self, point: &Point2<Float>) -> Point2<Float> {
        self.target_center + self.rotation*(point - self.source_center)
    }

    pub fn apply_inverse(&self, point: &Point2<Float>) -> Point2<Float> {
        self.source_center + self.rotation.inverse()*(point - self.target_center)
    }

    pub fn inverse(&self) -> RotationTransform2D {
        RotationTransform2D::new(-self.angle, self.target_center, self.source_center)
    }
}

#[derive(Debug,Clone)]
pub struct RotatedImage {
    pub image: Image,
    pub transform: RotationTransform2D,
    /// True where the pre-image of the target pixel lies inside the source
    pub valid: DMatrix<bool>
}

impl RotatedImage {
    /// Whether a point of the source frame lands inside the rotated image
    pub fn contains_source_point(&self, point: &Point2<Float>) -> bool {
        let target = self.transform.apply(point);
        self.image.is_inside(target.x, target.y)
    }

    pub fn valid_fraction(&self) -> Float {
        let valid_count = self.valid.iter().filter(|&&v| v).count();
        valid_count as Float / self.valid.len() as Float
    }
}

/// Center of the pixel grid
pub fn image_center(image: &Image) -> Point2<Float> {
    Point2::new((image.width() - 1) as Float / 2.0, (image.height() - 1) as Float / 2.0)
}

// Extent spans that are integral up to floating error are not grown by a pixel
fn span_to_size(span: Float) -> usize {
    let rounded = span.round();
    let span_corrected = match (span - rounded).abs() < 1e-6 {
        true => rounded,
        false => span.ceil()
    };
    span_corrected as usize + 1
}

/// Target extents and transform for rotating `image` by `angle` about `center`
pub fn rotation_frame(image: &Image, angle: Float, center: &Point2<Float>, extent: Extent) -> (usize, usize, RotationTransform2D) {
    match extent {
        Extent::Crop => (image.width(), image.height(), RotationTransform2D::about_center(angle, *center)),
        Extent::Expand => {
            let x_max = (image.width() - 1) as Float;
            let y_max = (image.height() - 1) as Float;
            let corners = [Point2::new(0.0,0.0), Point2::new(x_max,0.0), Point2::new(0.0,y_max), Point2::new(x_max,y_max)];
            let about_origin = RotationTransform2D::about_center(angle, *center);
            let rotated_corners = corners.iter().map(|c| about_origin.apply(c)).collect::<Vec<Point2<Float>>>();
            let min_x = rotated_corners.iter().map(|c| c.x).fold(Float::INFINITY, Float::min);
            let max_x = rotated_corners.iter().map(|c| c.x).fold(Float::NEG_INFINITY, Float::max);
            let min_y = rotated_corners.iter().map(|c| c.y).fold(Float::INFINITY, Float::min);
            let max_y = rotated_corners.iter().map(|c| c.y).fold(Float::NEG_INFINITY, Float::max);

            let width = span_to_size(max_x - min_x);
            let height = span_to_size(max_y - min_y);
            // Center the rotated content in the new grid
            let target_center = Point2::new(center.x - min_x - ((max_x - min_x) - (width - 1) as Float)/2.0,
                                            center.y - min_y - ((max_y - min_y) - (height - 1) as Float)/2.0);
            (width, height, RotationTransform2D::new(angle, *center, target_center))
        }
    }
}

/// Resamples `image` rotated by `angle` (radians) about `center`. Every target pixel is pulled from the source
/// through the inverse transform; pixels without a pre-image get `fill`.
pub fn rotate_image(image: &Image, angle: Float, center: &Point2<Float>, interpolation: Interpolation, extent: Extent, fill: Float) -> RotatedImage {
    let (width, height, transform) = rotation_frame(image, angle, center, extent);
    let mut target = Image::filled(width, height, fill, image.original_encoding);
    let mut valid = DMatrix::<bool>::from_element(height, width, false);

    for x in 0..width {
        for y in 0..height {
            let source = transform.apply_inverse(&Point2::new(x as Float, y as Float));
            let sample = match interpolation {
                Interpolation::Nearest => image.sample_nearest(source.x, source.y),
                Interpolation::Bilinear => image.sample_bilinear(source.x, source.y)
            };
            if let Some(value) = sample {
                target.buffer[(y,x)] = value;
                valid[(y,x)] = true;
            }
        }
    }

    RotatedImage{image: target, transform, valid}
}

pub fn rotate_points(points: &[Point2<Float>], transform: &RotationTransform2D) -> Vec<Point2<Float>> {
    points.iter().map(|p| transform.apply(p)).collect()
}

pub fn inverse_rotate_points(points: &[Point2<Float>], transform: &RotationTransform2D) -> Vec<Point2<Float>> {
    points.iter().map(|p| transform.apply_inverse(p)).collect()
}

/// Moves keypoints detected in the source frame into the target frame
pub fn rotate_keypoints(keypoints: &[KeyPoint], transform: &RotationTransform2D) -> Vec<KeyPoint> {
    keypoints.iter().map(|kp| {
        let location = transform.apply(&kp.location());
        KeyPoint{x: location.x, y: location.y, orientation: wrap_angle(kp.orientation + transform.angle()), ..*kp}
    }).collect()
}

/// Moves keypoints detected in the rotated frame back into the original frame. Scale is preserved, the
/// rotation angle is removed from the orientation.
pub fn rotate_keypoints_back(keypoints: &[KeyPoint], transform: &RotationTransform2D) -> Vec<KeyPoint> {
    keypoints.iter().map(|kp| {
        let location = transform.apply_inverse(&kp.location());
        KeyPoint{x: location.x, y: location.y, orientation: wrap_angle(kp.orientation - transform.angle()), ..*kp}
    }).collect()
}
