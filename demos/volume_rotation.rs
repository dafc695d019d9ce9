extern crate color_eyre;
extern crate keypoint_robustness;

use color_eyre::eyre::{Result, eyre, WrapErr};
use log::info;
use std::{env, fs, path::Path};

use keypoint_robustness::io::{load_raw_volume, save_image, VoxelType};
use keypoint_robustness::features::{Detector, sift_feature::SiftFeatureDetector, reference_sift::ReferenceSiftDetector};
use keypoint_robustness::experiment::{run_volume_experiment, write_experiment_outputs, experiment_config::ExperimentConfig};
use keypoint_robustness::rotation::{Interpolation, volume_rotation::{RotationTransform3D, in_plane_rotation, rotate_volume}};

fn parse_extent(arg: Option<&String>, name: &str) -> Result<usize> {
    arg.ok_or_else(|| eyre!("missing {}", name))?.parse::<usize>().wrap_err_with(|| format!("{} has to be a positive integer", name))
}

/// volume_rotation <raw file> <rows> <cols> <depth> <u8|u16|i16|f32> [angle in degrees]
fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();

    let args = env::args().collect::<Vec<String>>();
    let path = args.get(1).ok_or_else(|| eyre!("usage: volume_rotation <raw file> <rows> <cols> <depth> <u8|u16|i16|f32> [angle]"))?;
    let extents = (parse_extent(args.get(2), "rows")?, parse_extent(args.get(3), "cols")?, parse_extent(args.get(4), "depth")?);
    let voxel_type = match args.get(5).map(|s| s.as_str()) {
        Some("u8") => VoxelType::U8,
        Some("u16") => VoxelType::U16,
        Some("i16") => VoxelType::I16,
        Some("f32") => VoxelType::F32,
        other => return Err(eyre!("unknown voxel type {:?}", other))
    };
    let angle_deg = match args.get(6) {
        Some(angle) => angle.parse::<f64>().wrap_err("angle has to be a number")?,
        None => 45.0
    };

    let volume = load_raw_volume(Path::new(path), extents, voxel_type)?;
    let config = ExperimentConfig::default();
    let out_folder = Path::new(&config.output_folder);
    fs::create_dir_all(out_folder)?;

    let transform = RotationTransform3D::new(in_plane_rotation(angle_deg.to_radians()), volume.center());
    let rotated = rotate_volume(&volume, &transform, Interpolation::Bilinear, 0.0);
    let middle = volume.depth()/2;
    if let (Some(original_slice), Some(rotated_slice)) = (volume.slice(middle), rotated.slice(middle)) {
        save_image(original_slice, &out_folder.join("volume_slice.png"))?;
        save_image(rotated_slice, &out_folder.join("volume_slice_rotated.png"))?;
    }
    info!("rotated volume by {} deg about z", angle_deg);

    let sift_feature = SiftFeatureDetector::default();
    let reference_sift = ReferenceSiftDetector::default();
    let detectors: Vec<&dyn Detector> = vec![&sift_feature, &reference_sift];
    let results = run_volume_experiment(&volume, &detectors, &config)?;
    write_experiment_outputs(&results, &config)
}
