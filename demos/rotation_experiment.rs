extern crate color_eyre;
extern crate keypoint_robustness;

use color_eyre::eyre::Result;
use log::info;
use std::{env, path::Path};

use keypoint_robustness::io::load_image_as_gray;
use keypoint_robustness::features::{Detector, sift_feature::SiftFeatureDetector, reference_sift::ReferenceSiftDetector};
use keypoint_robustness::experiment::{run_rotation_experiment, write_experiment_outputs, experiment_config::{ExperimentConfig, load_experiment_config}};
use keypoint_robustness::load_runtime_conf;

/// rotation_experiment [image] [experiment.yaml]
fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();

    let runtime_conf = load_runtime_conf().unwrap_or_default();
    let args = env::args().collect::<Vec<String>>();

    let image_path = match args.get(1) {
        Some(path) => path.clone(),
        None => format!("{}/slice.png", runtime_conf.dataset_path)
    };
    let config = match args.get(2) {
        Some(path) => load_experiment_config(Path::new(path))?,
        None => ExperimentConfig{output_folder: runtime_conf.output_path.clone(), ..ExperimentConfig::default()}
    };

    let image = load_image_as_gray(Path::new(&image_path), false, false)?;
    info!("loaded {} ({}x{})", image_path, image.width(), image.height());

    let sift_feature = SiftFeatureDetector::default();
    let reference_sift = ReferenceSiftDetector::default();
    let detectors: Vec<&dyn Detector> = vec![&sift_feature, &reference_sift];

    let results = run_rotation_experiment(&image, &detectors, &config)?;
    for summary in results.summary() {
        println!("{}: mean {:.2}%, min {:.2}%, max {:.2}%", summary.detector, summary.mean_match_percentage, summary.min_match_percentage, summary.max_match_percentage);
    }

    write_experiment_outputs(&results, &config)
}
