use color_eyre::eyre::{Result, eyre, WrapErr};
use serde::{Serialize, Deserialize};
use std::{fs, path::Path};

use crate::Float;
use crate::matching::MatchParameters;
use crate::normalization::{NormalizationMode, Quantization};
use crate::rotation::{Interpolation, Extent};

/// Upper bound on the number of angles of one experiment
pub const MAX_ANGLE_COUNT: usize = 10_000;

/// Angles in degrees from start to stop. Stop is included when it is hit exactly.
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct AngleRange {
    pub start_deg: Float,
    pub stop_deg: Float,
    pub step_deg: Float
}

impl Default for AngleRange {
    fn default() -> AngleRange {
        AngleRange{start_deg: 0.0, stop_deg: 180.0, step_deg: 15.0}
    }
}

impl AngleRange {
    pub fn validate(&self) -> Result<()> {
        if !(self.start_deg.is_finite() && self.stop_deg.is_finite() && self.step_deg.is_finite()) {
            return Err(eyre!("angle range has to be finite: start {} stop {} step {}", self.start_deg, self.stop_deg, self.step_deg));
        }
        if !(self.step_deg > 0.0) {
            return Err(eyre!("angle step has to be positive, got {}", self.step_deg));
        }
        if !(self.stop_deg >= self.start_deg) {
            return Err(eyre!("angle range is empty: start {} stop {}", self.start_deg, self.stop_deg));
        }
        let count = self.step_count() + 1.0;
        if count > MAX_ANGLE_COUNT as Float {
            return Err(eyre!("angle range yields {} angles, at most {} are allowed", count, MAX_ANGLE_COUNT));
        }
        Ok(())
    }

    fn step_count(&self) -> Float {
        ((self.stop_deg - self.start_deg)/self.step_deg + 1e-9).floor()
    }

    pub fn angles_deg(&self) -> Vec<Float> {
        if self.validate().is_err() {
            return vec![];
        }
        let steps = self.step_count() as usize;
        (0..steps+1).map(|i| self.start_deg + (i as Float)*self.step_deg).collect()
    }
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub angles: AngleRange,
    pub match_parameters: MatchParameters,
    pub interpolation: Interpolation,
    pub extent: Extent,
    pub normalization: NormalizationMode,
    pub quantization: Quantization,
    /// Only count keypoints that are visible in both the original and the rotated image
    pub restrict_to_common_region: bool,
    /// Standard deviation of additive gaussian noise on the [0,1] images, none if absent
    pub noise_std: Option<Float>,
    pub seed: u64,
    /// Slice of a volume to run on, the middle slice if absent
    pub slice: Option<usize>,
    pub output_folder: String,
    pub plot: bool
}

impl Default for ExperimentConfig {
    fn default() -> ExperimentConfig {
        ExperimentConfig {
            angles: AngleRange::default(),
            match_parameters: MatchParameters::default(),
            interpolation: Interpolation::Bilinear,
            extent: Extent::Crop,
            normalization: NormalizationMode::default(),
            quantization: Quantization::default(),
            restrict_to_common_region: true,
            noise_std: None,
            seed: 0,
            slice: None,
            output_folder: String::from("output"),
            plot: true
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<()> {
        self.angles.validate()?;
        self.match_parameters.validate()?;
        self.normalization.validate()?;
        self.quantization.validate()?;
        match self.noise_std {
            Some(std) if !(std >= 0.0) => Err(eyre!("noise standard deviation has to be non negative, got {}", std)),
            _ => Ok(())
        }
    }
}

pub fn load_experiment_config(path: &Path) -> Result<ExperimentConfig> {
    let content = fs::read_to_string(path).wrap_err_with(|| format!("could not read experiment config {}", path.display()))?;
    let config: ExperimentConfig = serde_yaml::from_str(&content).wrap_err_with(|| format!("could not parse experiment config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
