extern crate image as image_rs;

use color_eyre::eyre::{Result, eyre, WrapErr};
use image_rs::ColorType;
use log::debug;
use serde::{Serialize, Deserialize};
use std::{fs, path::Path};

use crate::image::{Image, image_encoding::ImageEncoding, volume::Volume};

/// Sample type of a headerless raw volume. All types are little endian.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum VoxelType {
    U8,
    U16,
    I16,
    F32
}

impl VoxelType {
    pub fn byte_count(&self) -> usize {
        match *self {
            VoxelType::U8 => 1,
            VoxelType::U16 | VoxelType::I16 => 2,
            VoxelType::F32 => 4
        }
    }

    pub fn encoding(&self) -> ImageEncoding {
        match *self {
            VoxelType::U8 => ImageEncoding::U8,
            VoxelType::U16 => ImageEncoding::U16,
            VoxelType::I16 => ImageEncoding::S16,
            VoxelType::F32 => ImageEncoding::F64
        }
    }
}

/// Loads any image format supported by the image crate as a single channel image. 16 bit inputs keep their
/// precision.
pub fn load_image_as_gray(file_path: &Path, normalize: bool, invert_y: bool) -> Result<Image> {
    let dynamic_image = image_rs::open(file_path).wrap_err_with(|| format!("could not load image {}", file_path.display()))?;
    let image = match dynamic_image.color() {
        ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => Image::from_gray16_image(&dynamic_image.to_luma16(), normalize, invert_y),
        _ => Image::from_gray_image(&dynamic_image.to_luma8(), normalize, invert_y)
    };
    debug!("loaded {} with extents {}x{}", file_path.display(), image.width(), image.height());
    Ok(image)
}

/// Loads a headerless volume stored x fastest, then y, then z. `extents` are (rows, cols, depth).
pub fn load_raw_volume(file_path: &Path, extents: (usize,usize,usize), voxel_type: VoxelType) -> Result<Volume> {
    let bytes = fs::read(file_path).wrap_err_with(|| format!("could not read raw volume {}", file_path.display()))?;
    let (rows, cols, depth) = extents;
    let expected = rows*cols*depth*voxel_type.byte_count();
    if bytes.len() != expected {
        return Err(eyre!("{} has {} bytes, extents {:?} of {:?} need {}", file_path.display(), bytes.len(), extents, voxel_type, expected));
    }

    let volume = match voxel_type {
        VoxelType::U8 => Volume::from_voxels(&bytes, extents, voxel_type.encoding()),
        VoxelType::U16 => {
            let voxels = bytes.chunks_exact(2).map(|b| u16::from_le_bytes([b[0], b[1]])).collect::<Vec<u16>>();
            Volume::from_voxels(&voxels, extents, voxel_type.encoding())
        },
        VoxelType::I16 => {
            let voxels = bytes.chunks_exact(2).map(|b| i16::from_le_bytes([b[0], b[1]])).collect::<Vec<i16>>();
            Volume::from_voxels(&voxels, extents, voxel_type.encoding())
        },
        VoxelType::F32 => {
            let voxels = bytes.chunks_exact(4).map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])).collect::<Vec<f32>>();
            Volume::from_voxels(&voxels, extents, voxel_type.encoding())
        }
    }?;

    debug!("loaded raw volume {} with extents {:?}", file_path.display(), volume.extents());
    Ok(volume)
}

/// Writes the image as an 8 bit gray image, stretched to its intensity range
pub fn save_image(image: &Image, file_path: &Path) -> Result<()> {
    image.to_image().save(file_path).wrap_err_with(|| format!("could not save image {}", file_path.display()))
}

pub fn write_yaml<T: Serialize>(value: &T, file_path: &Path) -> Result<()> {
    let content = serde_yaml::to_string(value).wrap_err("could not serialize to yaml")?;
    fs::write(file_path, content).wrap_err_with(|| format!("could not write {}", file_path.display()))
}
