extern crate nalgebra as na;

use na::{Point3, Rotation3, Vector3};

use crate::Float;
use crate::image::{Image, volume::Volume};
use super::Interpolation;

/// Rigid rotation of voxel coordinates (x,y,z) about `center`. Extents are preserved.
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct RotationTransform3D {
    rotation: Rotation3<Float>,
    center: Point3<Float>
}

impl RotationTransform3D {
    pub fn new(rotation: Rotation3<Float>, center: Point3<Float>) -> RotationTransform3D {
        RotationTransform3D{rotation, center}
    }

    pub fn rotation(&self) -> &Rotation3<Float> {
        &self.rotation
    }

    pub fn center(&self) -> &Point3<Float> {
        &self.center
    }

    pub fn apply(&self, point: &Point3<Float>) -> Point3<Float> {
        self.center + self.rotation*(point - self.center)
    }

    pub fn apply_inverse(&self, point: &Point3<Float>) -> Point3<Float> {
        self.center + self.rotation.inverse()*(point - self.center)
    }

    pub fn inverse(&self) -> RotationTransform3D {
        RotationTransform3D::new(self.rotation.inverse(), self.center)
    }
}

/// Rotation about the slice normal, matching [super::RotationTransform2D] inside every slice
pub fn in_plane_rotation(angle: Float) -> Rotation3<Float> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle)
}

pub fn rotate_volume(volume: &Volume, transform: &RotationTransform3D, interpolation: Interpolation, fill: Float) -> Volume {
    let (rows, cols, depth) = volume.extents();
    let mut slices = (0..depth).map(|_| Image::filled(cols, rows, fill, volume.encoding())).collect::<Vec<Image>>();

    for (z, slice) in slices.iter_mut().enumerate() {
        for x in 0..cols {
            for y in 0..rows {
                let source = transform.apply_inverse(&Point3::new(x as Float, y as Float, z as Float));
                let sample = match interpolation {
                    Interpolation::Nearest => volume.sample_nearest(source.x, source.y, source.z),
                    Interpolation::Bilinear => volume.sample_trilinear(source.x, source.y, source.z)
                };
                if let Some(value) = sample {
                    slice.buffer[(y,x)] = value;
                }
            }
        }
    }

    Volume{slices}
}

pub fn rotate_points_3d(points: &[Point3<Float>], transform: &RotationTransform3D) -> Vec<Point3<Float>> {
    points.iter().map(|p| transform.apply(p)).collect()
}

pub fn inverse_rotate_points_3d(points: &[Point3<Float>], transform: &RotationTransform3D) -> Vec<Point3<Float>> {
    points.iter().map(|p| transform.apply_inverse(p)).collect()
}
