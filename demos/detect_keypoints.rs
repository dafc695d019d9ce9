extern crate color_eyre;
extern crate keypoint_robustness;

use color_eyre::eyre::{Result, WrapErr};
use std::{env, fs, path::Path};

use keypoint_robustness::io::{load_image_as_gray, save_image};
use keypoint_robustness::features::{Detector, sift_feature::SiftFeatureDetector, reference_sift::ReferenceSiftDetector};
use keypoint_robustness::experiment::{prepare_image, run_single_rotation, experiment_config::ExperimentConfig};
use keypoint_robustness::rotation::{rotate_image, image_center};
use keypoint_robustness::visualize::{draw_keypoints, display_matches};
use keypoint_robustness::load_runtime_conf;

/// detect_keypoints [image] [angle in degrees]
fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();

    let runtime_conf = load_runtime_conf().unwrap_or_default();
    let args = env::args().collect::<Vec<String>>();
    let image_path = match args.get(1) {
        Some(path) => path.clone(),
        None => format!("{}/slice.png", runtime_conf.dataset_path)
    };
    let angle_deg = match args.get(2) {
        Some(angle) => angle.parse::<f64>().wrap_err("angle has to be a number")?,
        None => 30.0
    };

    let config = ExperimentConfig::default();
    let image = prepare_image(&load_image_as_gray(Path::new(&image_path), false, false)?, &config)?;
    let rotated = rotate_image(&image, angle_deg.to_radians(), &image_center(&image), config.interpolation, config.extent, 0.0);

    let out_folder = Path::new(&runtime_conf.output_path);
    fs::create_dir_all(out_folder)?;

    let sift_feature = SiftFeatureDetector::default();
    let reference_sift = ReferenceSiftDetector::default();
    let detectors: Vec<&dyn Detector> = vec![&sift_feature, &reference_sift];

    for detector in detectors {
        let keypoints = detector.detect(&image);
        let trial = run_single_rotation(&image, detector, &keypoints, angle_deg, &config);
        println!("{}: {} keypoints, {} in rotated image, {:.2}% matched", detector.name(), keypoints.len(), trial.report.transformed_count, trial.report.match_percentage);

        save_image(&draw_keypoints(&image, &keypoints), &out_folder.join(format!("{}_keypoints.png", detector.name())))?;
        save_image(&draw_keypoints(&rotated.image, &detector.detect(&rotated.image)), &out_folder.join(format!("{}_rotated_keypoints.png", detector.name())))?;
        save_image(&display_matches(&image, &image, &trial.reference, &trial.back_rotated, &trial.report.matches), &out_folder.join(format!("{}_matches.png", detector.name())))?;
    }

    Ok(())
}
