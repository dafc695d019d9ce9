extern crate rand;
extern crate rand_distr;

use color_eyre::eyre::{Result, eyre, WrapErr};
use log::{info, debug};
use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::{Normal, Distribution};
use serde::{Serialize, Deserialize};
use std::{fs, path::Path};

use crate::Float;
use crate::image::{Image, volume::Volume};
use crate::features::{Detector, keypoint::KeyPoint};
use crate::matching::{match_keypoints, collapse_orientations, MatchReport};
use crate::normalization::{normalize_image, normalize_volume};
use crate::rotation::{rotate_image, rotate_keypoints_back, image_center, RotatedImage, RotationTransform2D};
use crate::visualize::plot::{draw_match_percentage_graph, draw_keypoint_count_graph};
use crate::io::write_yaml;
use self::experiment_config::ExperimentConfig;

pub mod experiment_config;

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct AngleResult {
    pub angle_deg: Float,
    pub reference_count: usize,
    pub rotated_count: usize,
    pub matched_count: usize,
    pub match_percentage: Float,
    pub repeatability: Float
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct DetectorSeries {
    pub detector: String,
    pub results: Vec<AngleResult>
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct SeriesSummary {
    pub detector: String,
    pub mean_match_percentage: Float,
    pub min_match_percentage: Float,
    pub max_match_percentage: Float,
    pub mean_repeatability: Float
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct ExperimentResults {
    pub series: Vec<DetectorSeries>
}

impl ExperimentResults {
    pub fn series_for(&self, detector: &str) -> Option<&DetectorSeries> {
        self.series.iter().find(|s| s.detector == detector)
    }

    pub fn summary(&self) -> Vec<SeriesSummary> {
        self.series.iter().map(|series| {
            let percentages = series.results.iter().map(|r| r.match_percentage).collect::<Vec<Float>>();
            let count = percentages.len().max(1) as Float;
            let (min, max) = match percentages.is_empty() {
                true => (0.0, 0.0),
                false => (percentages.iter().cloned().fold(Float::INFINITY, Float::min),
                          percentages.iter().cloned().fold(Float::NEG_INFINITY, Float::max))
            };
            SeriesSummary {
                detector: series.detector.clone(),
                mean_match_percentage: percentages.iter().sum::<Float>()/count,
                min_match_percentage: min,
                max_match_percentage: max,
                mean_repeatability: series.results.iter().map(|r| r.repeatability).sum::<Float>()/count
            }
        }).collect()
    }
}

/// Everything produced by one detector at one angle
#[derive(Debug,Clone)]
pub struct RotationTrial {
    pub transform: RotationTransform2D,
    /// Reference keypoints that take part in the matching
    pub reference: Vec<KeyPoint>,
    /// Keypoints detected in the rotated image, mapped into the original frame
    pub back_rotated: Vec<KeyPoint>,
    pub report: MatchReport
}

impl RotationTrial {
    pub fn angle_result(&self, angle_deg: Float) -> AngleResult {
        AngleResult {
            angle_deg,
            reference_count: self.report.reference_count,
            rotated_count: self.report.transformed_count,
            matched_count: self.report.matched_count,
            match_percentage: self.report.match_percentage,
            repeatability: self.report.repeatability
        }
    }
}

fn add_noise(image: &Image, noise: &Option<Normal<Float>>, rng: &mut SmallRng) -> Image {
    match noise {
        Some(distribution) => Image{buffer: image.buffer.map(|v| v + distribution.sample(rng)), original_encoding: image.original_encoding},
        None => image.clone()
    }
}

fn noise_distribution(config: &ExperimentConfig) -> Result<Option<Normal<Float>>> {
    match config.noise_std {
        Some(std) if std > 0.0 => Normal::new(0.0, std).map(Some).map_err(|e| eyre!("invalid noise distribution: {}", e)),
        _ => Ok(None)
    }
}

/// Normalizes and quantizes the image as configured and rescales it to [0,1] for the detectors
pub fn prepare_image(image: &Image, config: &ExperimentConfig) -> Result<Image> {
    let normalized = normalize_image(image, &config.normalization, &config.quantization)?;
    Ok(config.quantization.to_unit(&normalized))
}

/// Detects on an already rotated image and matches the detections, mapped back into the frame of `image`,
/// against `reference`, the detections of the same detector on `image`. Unless orientations are compared,
/// keypoints that differ only in orientation count once on either side.
pub fn evaluate_rotation(image: &Image, rotated: &RotatedImage, detector: &dyn Detector, reference: &Vec<KeyPoint>, config: &ExperimentConfig) -> RotationTrial {
    let detected = detector.detect(&rotated.image);
    let (reference, detected) = match config.match_parameters.orientation_tolerance {
        None => (collapse_orientations(reference), collapse_orientations(&detected)),
        Some(_) => (reference.clone(), detected)
    };
    let mut back_rotated = rotate_keypoints_back(&detected, &rotated.transform);

    let reference_kept = match config.restrict_to_common_region {
        true => {
            back_rotated.retain(|kp| image.is_inside(kp.x, kp.y));
            reference.into_iter().filter(|kp| rotated.contains_source_point(&kp.location())).collect::<Vec<KeyPoint>>()
        },
        false => reference
    };

    let report = match_keypoints(&reference_kept, &back_rotated, &config.match_parameters);
    debug!("{} at {:.2} rad: {} reference, {} rotated, {} matched", detector.name(), rotated.transform.angle(), report.reference_count, report.transformed_count, report.matched_count);

    RotationTrial{transform: rotated.transform, reference: reference_kept, back_rotated, report}
}

/// Rotates `image` by `angle_deg` about its center and evaluates `detector` on the result
pub fn run_single_rotation(image: &Image, detector: &dyn Detector, reference: &Vec<KeyPoint>, angle_deg: Float, config: &ExperimentConfig) -> RotationTrial {
    let rotated = rotate_image(image, angle_deg.to_radians(), &image_center(image), config.interpolation, config.extent, 0.0);
    evaluate_rotation(image, &rotated, detector, reference, config)
}

fn run_on_unit_image(unit_image: &Image, detectors: &[&dyn Detector], config: &ExperimentConfig) -> Result<ExperimentResults> {
    let noise = noise_distribution(config)?;
    let mut rng = SmallRng::seed_from_u64(config.seed);

    let reference_image = add_noise(unit_image, &noise, &mut rng);
    let references = detectors.iter().map(|detector| {
        let keypoints = detector.detect(&reference_image);
        info!("{}: {} keypoints on the unrotated image", detector.name(), keypoints.len());
        keypoints
    }).collect::<Vec<Vec<KeyPoint>>>();

    let mut series = detectors.iter().map(|detector| DetectorSeries{detector: detector.name().to_string(), results: vec![]}).collect::<Vec<DetectorSeries>>();
    let center = image_center(unit_image);

    for angle_deg in config.angles.angles_deg() {
        // Every detector sees the same rotated image
        let mut rotated = rotate_image(unit_image, angle_deg.to_radians(), &center, config.interpolation, config.extent, 0.0);
        rotated.image = add_noise(&rotated.image, &noise, &mut rng);

        for (i, detector) in detectors.iter().enumerate() {
            let trial = evaluate_rotation(unit_image, &rotated, *detector, &references[i], config);
            let result = trial.angle_result(angle_deg);
            info!("{} at {} deg: {:.2}% matched", detector.name(), angle_deg, result.match_percentage);
            series[i].results.push(result);
        }
    }

    Ok(ExperimentResults{series})
}

pub fn run_rotation_experiment(image: &Image, detectors: &[&dyn Detector], config: &ExperimentConfig) -> Result<ExperimentResults> {
    config.validate()?;
    let unit_image = prepare_image(image, config)?;
    run_on_unit_image(&unit_image, detectors, config)
}

/// Runs the image experiment on one axial slice. Normalization uses the statistics of the whole volume.
pub fn run_volume_experiment(volume: &Volume, detectors: &[&dyn Detector], config: &ExperimentConfig) -> Result<ExperimentResults> {
    config.validate()?;
    let slice_index = config.slice.unwrap_or(volume.depth()/2);
    let normalized = normalize_volume(volume, &config.normalization, &config.quantization)?;
    let slice = normalized.slice(slice_index).ok_or_else(|| eyre!("slice {} is outside of a volume with depth {}", slice_index, volume.depth()))?;
    info!("running on slice {} of {}", slice_index, volume.depth());
    run_on_unit_image(&config.quantization.to_unit(slice), detectors, config)
}

/// Writes results.yaml and, if enabled, the plots into the output folder
pub fn write_experiment_outputs(results: &ExperimentResults, config: &ExperimentConfig) -> Result<()> {
    let folder = Path::new(&config.output_folder);
    fs::create_dir_all(folder).wrap_err_with(|| format!("could not create output folder {}", folder.display()))?;
    write_yaml(results, &folder.join("results.yaml"))?;
    write_yaml(&results.summary(), &folder.join("summary.yaml"))?;

    if config.plot {
        draw_match_percentage_graph(results, &config.output_folder, "match_percentage.png").map_err(|e| eyre!("could not plot match percentage: {}", e))?;
        draw_keypoint_count_graph(results, &config.output_folder, "keypoint_count.png").map_err(|e| eyre!("could not plot keypoint counts: {}", e))?;
    }

    info!("wrote results to {}", folder.display());
    Ok(())
}
