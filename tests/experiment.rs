mod common;

use std::{env, fs};

use keypoint_robustness::{Float, float};
use keypoint_robustness::experiment::{run_rotation_experiment, run_volume_experiment, write_experiment_outputs, ExperimentResults};
use keypoint_robustness::experiment::experiment_config::{AngleRange, ExperimentConfig, load_experiment_config, MAX_ANGLE_COUNT};
use keypoint_robustness::features::{Detector, keypoint::KeyPoint, sift_feature::SiftFeatureDetector, reference_sift::ReferenceSiftDetector};
use keypoint_robustness::image::{Image, volume::Volume};
use keypoint_robustness::matching::{Assignment, MatchParameters};
use keypoint_robustness::rotation::{Extent, image_center};
use keypoint_robustness::normalization::{NormalizationMode, Quantization};

fn blob_image() -> Image {
    common::gaussian_blob_image(64, 64, &[(32.0, 32.0, 2.8, 1.0)])
}

fn config(start_deg: Float, stop_deg: Float, step_deg: Float) -> ExperimentConfig {
    ExperimentConfig {
        angles: AngleRange{start_deg, stop_deg, step_deg},
        plot: false,
        ..ExperimentConfig::default()
    }
}

fn run(config: &ExperimentConfig) -> ExperimentResults {
    let sift_feature = SiftFeatureDetector::default();
    let reference_sift = ReferenceSiftDetector::default();
    let detectors: Vec<&dyn Detector> = vec![&sift_feature, &reference_sift];
    run_rotation_experiment(&blob_image(), &detectors, config).unwrap()
}

#[test]
fn angle_range_includes_stop() {
    let angles = AngleRange::default().angles_deg();
    assert_eq!(angles.len(), 13);
    assert_eq!(angles[0], 0.0);
    assert_eq!(angles[12], 180.0);

    let uneven = AngleRange{start_deg: 0.0, stop_deg: 50.0, step_deg: 20.0}.angles_deg();
    assert_eq!(uneven, vec![0.0, 20.0, 40.0]);
    assert_eq!(AngleRange{start_deg: 10.0, stop_deg: 10.0, step_deg: 5.0}.angles_deg(), vec![10.0]);
}

#[test]
fn invalid_angle_ranges_are_rejected() {
    assert!(AngleRange{start_deg: 0.0, stop_deg: 90.0, step_deg: 0.0}.validate().is_err());
    assert!(AngleRange{start_deg: 90.0, stop_deg: 0.0, step_deg: 15.0}.validate().is_err());
    assert!(AngleRange{start_deg: 90.0, stop_deg: 0.0, step_deg: 15.0}.angles_deg().is_empty());
}

#[test]
fn zero_rotation_matches_everything() {
    let results = run(&config(0.0, 0.0, 1.0));
    assert_eq!(results.series.len(), 2);
    for series in results.series.iter() {
        assert_eq!(series.results.len(), 1);
        let result = &series.results[0];
        assert!(result.reference_count > 0, "{}", series.detector);
        assert_eq!(result.reference_count, result.rotated_count);
        assert_eq!(result.match_percentage, 100.0, "{}", series.detector);
        assert_eq!(result.repeatability, 100.0);
    }
}

#[test]
fn one_result_per_angle_and_detector() {
    let results = run(&config(0.0, 90.0, 45.0));
    assert!(results.series_for("sift_feature").is_some());
    assert!(results.series_for("reference_sift").is_some());
    assert!(results.series_for("orb").is_none());

    for series in results.series.iter() {
        let angles = series.results.iter().map(|r| r.angle_deg).collect::<Vec<Float>>();
        assert_eq!(angles, vec![0.0, 45.0, 90.0]);
        for result in series.results.iter() {
            assert!(result.match_percentage >= 0.0 && result.match_percentage <= 100.0);
            assert!(result.matched_count <= result.reference_count);
        }
    }

    let summary = results.summary();
    assert_eq!(summary.len(), 2);
    for (s, series) in summary.iter().zip(results.series.iter()) {
        assert_eq!(s.detector, series.detector);
        assert_eq!(s.max_match_percentage, 100.0);
        assert!(s.min_match_percentage <= s.mean_match_percentage && s.mean_match_percentage <= s.max_match_percentage);
    }
}

#[test]
fn noise_is_reproducible() {
    let noisy = ExperimentConfig{noise_std: Some(0.01), seed: 7, ..config(0.0, 30.0, 30.0)};
    assert_eq!(run(&noisy), run(&noisy));
}

#[test]
fn invalid_config_is_rejected() {
    let sift_feature = SiftFeatureDetector::default();
    let detectors: Vec<&dyn Detector> = vec![&sift_feature];

    let bad_noise = ExperimentConfig{noise_std: Some(-1.0), ..config(0.0, 0.0, 1.0)};
    assert!(run_rotation_experiment(&blob_image(), &detectors, &bad_noise).is_err());

    let bad_quantization = ExperimentConfig{quantization: Quantization::Levels(1), ..config(0.0, 0.0, 1.0)};
    assert!(run_rotation_experiment(&blob_image(), &detectors, &bad_quantization).is_err());
}

#[test]
fn volume_slice_out_of_range() {
    let volume = Volume::new(vec![blob_image(), blob_image()]).unwrap();
    let sift_feature = SiftFeatureDetector::default();
    let detectors: Vec<&dyn Detector> = vec![&sift_feature];

    let outside = ExperimentConfig{slice: Some(2), ..config(0.0, 0.0, 1.0)};
    assert!(run_volume_experiment(&volume, &detectors, &outside).is_err());

    let inside = ExperimentConfig{slice: Some(1), ..config(0.0, 0.0, 1.0)};
    let results = run_volume_experiment(&volume, &detectors, &inside).unwrap();
    assert_eq!(results.series[0].results[0].match_percentage, 100.0);
}

#[test]
fn config_from_yaml() {
    let path = env::temp_dir().join(format!("keypoint_robustness_config_{}.yaml", std::process::id()));
    let content = "
angles:
  start_deg: 0.0
  stop_deg: 90.0
  step_deg: 30.0
match_parameters:
  distance_tolerance: 2.0
  assignment: Nearest
normalization: !ZScore
  clip: 3.0
quantization: !Levels 16
plot: false
";
    fs::write(&path, content).unwrap();
    let config = load_experiment_config(&path).unwrap();

    assert_eq!(config.angles.angles_deg().len(), 4);
    assert_eq!(config.match_parameters.distance_tolerance, 2.0);
    assert_eq!(config.match_parameters.scale_ratio_tolerance, 1.5);
    assert_eq!(config.match_parameters.assignment, Assignment::Nearest);
    assert_eq!(config.normalization, NormalizationMode::ZScore{clip: 3.0});
    assert_eq!(config.quantization, Quantization::Levels(16));
    assert!(config.restrict_to_common_region);

    fs::write(&path, "angles:\n  start_deg: 0.0\n  stop_deg: 90.0\n  step_deg: -1.0\n").unwrap();
    assert!(load_experiment_config(&path).is_err());
    fs::remove_file(&path).unwrap();
}

#[test]
fn outputs_are_written() {
    let folder = env::temp_dir().join(format!("keypoint_robustness_output_{}", std::process::id()));
    let config = ExperimentConfig{output_folder: folder.to_string_lossy().to_string(), plot: true, ..config(0.0, 90.0, 45.0)};
    let results = run(&config);
    write_experiment_outputs(&results, &config).unwrap();

    assert!(folder.join("match_percentage.png").exists());
    assert!(folder.join("keypoint_count.png").exists());

    let written: ExperimentResults = serde_yaml::from_str(&fs::read_to_string(folder.join("results.yaml")).unwrap()).unwrap();
    assert_eq!(written.series.len(), results.series.len());
    assert!(folder.join("summary.yaml").exists());
    fs::remove_dir_all(&folder).unwrap();
}

#[test]
fn unbounded_angle_ranges_are_rejected() {
    assert!(AngleRange{start_deg: 0.0, stop_deg: Float::INFINITY, step_deg: 1.0}.validate().is_err());
    assert!(AngleRange{start_deg: Float::NAN, stop_deg: 10.0, step_deg: 1.0}.validate().is_err());
    assert!(AngleRange{start_deg: 0.0, stop_deg: 10.0, step_deg: Float::INFINITY}.validate().is_err());
    assert!(AngleRange{start_deg: 0.0, stop_deg: Float::INFINITY, step_deg: 1.0}.angles_deg().is_empty());

    let huge = AngleRange{start_deg: 0.0, stop_deg: 1e12, step_deg: 1.0};
    assert!(huge.validate().is_err());
    assert!(huge.angles_deg().is_empty());

    let largest = AngleRange{start_deg: 0.0, stop_deg: (MAX_ANGLE_COUNT - 1) as Float, step_deg: 1.0};
    assert!(largest.validate().is_ok());
    assert_eq!(largest.angles_deg().len(), MAX_ANGLE_COUNT);

    let path = env::temp_dir().join(format!("keypoint_robustness_infinite_{}.yaml", std::process::id()));
    fs::write(&path, "angles: {start_deg: 0.0, stop_deg: .inf, step_deg: 1.0}\n").unwrap();
    let loaded = load_experiment_config(&path);
    fs::remove_file(&path).unwrap();
    assert!(loaded.is_err());
}

/// Reports the image center once per orientation. Images of the input size get three orientations, larger ones one.
struct CenterDetector;

impl Detector for CenterDetector {
    fn name(&self) -> &str {
        "center"
    }

    fn detect(&self, image: &Image) -> Vec<KeyPoint> {
        let center = image_center(image);
        let orientations = match image.width() == 64 {
            true => vec![0.0, 2.0, 4.0],
            false => vec![1.0]
        };
        orientations.into_iter().map(|orientation| KeyPoint{orientation, ..KeyPoint::new(center.x, center.y, 2.5)}).collect()
    }
}

#[test]
fn orientation_duplicates_count_once() {
    let detector = CenterDetector;
    let detectors: Vec<&dyn Detector> = vec![&detector];
    let expand = ExperimentConfig{extent: Extent::Expand, ..config(15.0, 75.0, 60.0)};

    let results = run_rotation_experiment(&blob_image(), &detectors, &expand).unwrap();
    for result in results.series[0].results.iter() {
        assert_eq!(result.reference_count, 1);
        assert_eq!(result.rotated_count, 1);
        assert_eq!(result.match_percentage, 100.0);
    }

    // Orientations that are compared stay distinct
    let with_orientation = ExperimentConfig{
        match_parameters: MatchParameters{orientation_tolerance: Some(float::consts::PI), ..MatchParameters::default()},
        ..expand
    };
    let results = run_rotation_experiment(&blob_image(), &detectors, &with_orientation).unwrap();
    for result in results.series[0].results.iter() {
        assert_eq!(result.reference_count, 3);
        assert_eq!(result.matched_count, 1);
    }
}

#[test]
fn expanded_rotation_keeps_the_blob() {
    let expand = ExperimentConfig{extent: Extent::Expand, ..config(0.0, 90.0, 15.0)};
    let results = run(&expand);
    for series in results.series.iter() {
        assert_eq!(series.results.len(), 7);
        assert_eq!(series.results[0].match_percentage, 100.0);
        for result in series.results.iter() {
            assert!(result.rotated_count > 0, "{} at {}", series.detector, result.angle_deg);
        }
    }
    // The blob sits at the exact same location and scale in both frames
    let reference_sift = results.series_for("reference_sift").unwrap();
    for result in reference_sift.results.iter().filter(|r| r.angle_deg == 15.0 || r.angle_deg == 75.0) {
        assert_eq!(result.match_percentage, 100.0, "at {}", result.angle_deg);
    }
}

#[test]
fn cropped_corners_count_as_misses_without_common_region() {
    let mut blobs = Vec::<(Float,Float,Float,Float)>::new();
    for i in 0..6 {
        for j in 0..6 {
            blobs.push((8.0 + 16.0*i as Float, 8.0 + 16.0*j as Float, 2.8, 1.0));
        }
    }
    let image = common::gaussian_blob_image(96, 96, &blobs);
    let sift_feature = SiftFeatureDetector::default();
    let detectors: Vec<&dyn Detector> = vec![&sift_feature];

    let common_region = config(0.0, 45.0, 45.0);
    let everything = ExperimentConfig{restrict_to_common_region: false, ..config(0.0, 45.0, 45.0)};
    let restricted = &run_rotation_experiment(&image, &detectors, &common_region).unwrap().series[0].results;
    let unrestricted = &run_rotation_experiment(&image, &detectors, &everything).unwrap().series[0].results;

    let unrotated_count = unrestricted[0].reference_count;
    assert!(unrotated_count > 0);
    assert_eq!(unrestricted[1].reference_count, unrotated_count);
    assert!(restricted[1].reference_count < unrotated_count);
    assert!(unrestricted[1].match_percentage < restricted[1].match_percentage);
}
