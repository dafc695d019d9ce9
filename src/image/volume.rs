extern crate nalgebra as na;

use color_eyre::eyre::{Result, eyre};
use na::{DMatrix, Point3};
use num_traits::ToPrimitive;

use crate::Float;
use crate::image::{Image, image_encoding::ImageEncoding};

/// A stack of equally sized slices. Voxel (x,y,z) lives at `slices[z].buffer[(y,x)]`.
#[derive(Debug,Clone,PartialEq)]
pub struct Volume {
    pub slices: Vec<Image>
}

impl Volume {

    pub fn new(slices: Vec<Image>) -> Result<Volume> {
        let first = slices.first().ok_or_else(|| eyre!("a volume needs at least one slice"))?;
        let (rows, cols) = first.buffer.shape();
        if rows == 0 || cols == 0 {
            return Err(eyre!("volume slices must not be empty"));
        }
        if let Some(idx) = slices.iter().position(|s| s.buffer.shape() != (rows,cols)) {
            return Err(eyre!("slice {} has extents {:?}, expected ({},{})", idx, slices[idx].buffer.shape(), rows, cols));
        }
        Ok(Volume{slices})
    }

    pub fn zeros(rows: usize, cols: usize, depth: usize, encoding: ImageEncoding) -> Volume {
        assert!(rows > 0 && cols > 0 && depth > 0);
        Volume{slices: (0..depth).map(|_| Image::empty(cols, rows, encoding)).collect()}
    }

    /// Builds a volume from voxels stored x fastest, then y, then z.
    pub fn from_voxels<T: ToPrimitive + Copy>(voxels: &[T], (rows,cols,depth): (usize,usize,usize), encoding: ImageEncoding) -> Result<Volume> {
        let slice_size = rows*cols;
        if slice_size*depth != voxels.len() || slice_size == 0 || depth == 0 {
            return Err(eyre!("{} voxels do not fit extents ({},{},{})", voxels.len(), rows, cols, depth));
        }

        let mut slices = Vec::<Image>::with_capacity(depth);
        for slice_voxels in voxels.chunks_exact(slice_size) {
            let values = slice_voxels.iter().map(|v| v.to_f64().map(|f| f as Float).ok_or_else(|| eyre!("voxel not representable as float"))).collect::<Result<Vec<Float>>>()?;
            let buffer = DMatrix::<Float>::from_row_slice(rows, cols, &values);
            slices.push(Image{buffer, original_encoding: encoding});
        }
        Volume::new(slices)
    }

    /// (M rows, N columns, R slices)
    pub fn extents(&self) -> (usize,usize,usize) {
        (self.rows(), self.cols(), self.depth())
    }

    pub fn rows(&self) -> usize {
        self.slices[0].height()
    }

    pub fn cols(&self) -> usize {
        self.slices[0].width()
    }

    pub fn depth(&self) -> usize {
        self.slices.len()
    }

    pub fn encoding(&self) -> ImageEncoding {
        self.slices[0].original_encoding
    }

    pub fn slice(&self, z: usize) -> Option<&Image> {
        self.slices.get(z)
    }

    pub fn voxel(&self, x: usize, y: usize, z: usize) -> Float {
        self.slices[z].buffer[(y,x)]
    }

    pub fn values(&self) -> impl Iterator<Item = &Float> {
        self.slices.iter().flat_map(|s| s.buffer.iter())
    }

    pub fn center(&self) -> Point3<Float> {
        Point3::new((self.cols() - 1) as Float / 2.0, (self.rows() - 1) as Float / 2.0, (self.depth() - 1) as Float / 2.0)
    }

    pub fn sample_nearest(&self, x: Float, y: Float, z: Float) -> Option<Float> {
        let z_round = z.round();
        match z_round >= 0.0 && z_round < self.depth() as Float {
            true => self.slices[z_round as usize].sample_nearest(x, y),
            false => None
        }
    }

    pub fn sample_trilinear(&self, x: Float, y: Float, z: Float) -> Option<Float> {
        let z_max = (self.depth() - 1) as Float;
        if z < -1e-9 || z > z_max + 1e-9 {
            return None;
        }
        let z_clamped = z.clamp(0.0, z_max);
        let z_0 = z_clamped.floor() as usize;
        let z_1 = (z_0 + 1).min(self.depth() - 1);
        let c = z_clamped - z_0 as Float;

        let lower = self.slices[z_0].sample_bilinear(x, y)?;
        let upper = self.slices[z_1].sample_bilinear(x, y)?;
        Some((1.0-c)*lower + c*upper)
    }
}
