use std::{env, fs};

use keypoint_robustness::image::{image_encoding::ImageEncoding, volume::Volume};
use keypoint_robustness::io::{load_raw_volume, VoxelType};

fn temp_file(name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = env::temp_dir().join(format!("keypoint_robustness_{}_{}", std::process::id(), name));
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn raw_u16_volume_is_x_fastest() {
    // rows 2, cols 3, depth 2
    let values: Vec<u16> = (0..12).map(|v| v*100).collect();
    let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<u8>>();
    let path = temp_file("u16.raw", &bytes);

    let volume = load_raw_volume(&path, (2,3,2), VoxelType::U16).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(volume.extents(), (2,3,2));
    assert_eq!(volume.encoding(), ImageEncoding::U16);
    assert_eq!(volume.voxel(0, 0, 0), 0.0);
    assert_eq!(volume.voxel(1, 0, 0), 100.0);
    assert_eq!(volume.voxel(0, 1, 0), 300.0);
    assert_eq!(volume.voxel(2, 1, 1), 1100.0);
}

#[test]
fn raw_signed_and_float_voxels() {
    let signed: Vec<i16> = vec![-5, 7, -32768, 32767];
    let bytes = signed.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<u8>>();
    let path = temp_file("i16.raw", &bytes);
    let volume = load_raw_volume(&path, (2,2,1), VoxelType::I16).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(volume.voxel(0, 0, 0), -5.0);
    assert_eq!(volume.voxel(0, 1, 0), -32768.0);

    let floats: Vec<f32> = vec![0.5, -1.25];
    let bytes = floats.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<u8>>();
    let path = temp_file("f32.raw", &bytes);
    let volume = load_raw_volume(&path, (1,1,2), VoxelType::F32).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(volume.voxel(0, 0, 1), -1.25);
}

#[test]
fn size_mismatch_is_an_error() {
    let path = temp_file("short.raw", &[1, 2, 3]);
    let result = load_raw_volume(&path, (2,2,1), VoxelType::U8);
    fs::remove_file(&path).unwrap();
    assert!(result.is_err());
}

#[test]
fn missing_file_is_an_error() {
    let path = env::temp_dir().join("keypoint_robustness_does_not_exist.raw");
    assert!(load_raw_volume(&path, (1,1,1), VoxelType::U8).is_err());
}

#[test]
fn volume_construction_checks_extents() {
    assert!(Volume::new(vec![]).is_err());
    assert!(Volume::from_voxels(&[1u8, 2, 3], (2,2,1), ImageEncoding::U8).is_err());
    let volume = Volume::from_voxels(&[1u8, 2, 3, 4], (2,2,1), ImageEncoding::U8).unwrap();
    assert_eq!(volume.center(), nalgebra::Point3::new(0.5, 0.5, 0.0));
    assert_eq!(volume.sample_trilinear(0.5, 0.5, 0.0), Some(2.5));
    assert_eq!(volume.sample_nearest(3.0, 0.0, 0.0), None);
}
