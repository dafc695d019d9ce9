extern crate nalgebra as na;
extern crate image as image_rs;

use std::{env, fs, path::Path};
use color_eyre::eyre::{Result, WrapErr};
use serde::{Serialize, Deserialize};

pub mod image;
pub mod filter;
pub mod numerics;
pub mod normalization;
pub mod rotation;
pub mod pyramid;
pub mod features;
pub mod matching;
pub mod experiment;
pub mod visualize;
pub mod io;

macro_rules! define_float {
    ($f:tt) => {
        pub use std::$f as float;
        pub type Float = $f;
    }
}

define_float!(f64);

pub const RUNTIME_CONF_ENV: &str = "KEYPOINT_ROBUSTNESS_CONF";
pub const DEFAULT_RUNTIME_CONF: &str = "runtime_conf.yaml";

#[repr(u8)]
#[derive(Debug,Copy,Clone,PartialEq)]
pub enum GradientDirection {
    HORIZONTAL,
    VERTICAL,
    SIGMA
}

/// Machine specific paths. Everything experiment related lives in [experiment::experiment_config::ExperimentConfig].
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct RuntimeConf {
    pub output_path: String,
    pub dataset_path: String
}

impl Default for RuntimeConf {
    fn default() -> RuntimeConf {
        RuntimeConf {
            output_path: String::from("output"),
            dataset_path: String::from("images")
        }
    }
}

/// Loads the runtime conf named by `KEYPOINT_ROBUSTNESS_CONF`, or `runtime_conf.yaml` in the working directory.
pub fn load_runtime_conf() -> Result<RuntimeConf> {
    let path = env::var(RUNTIME_CONF_ENV).unwrap_or_else(|_| String::from(DEFAULT_RUNTIME_CONF));
    load_runtime_conf_from(Path::new(&path))
}

pub fn load_runtime_conf_from(path: &Path) -> Result<RuntimeConf> {
    let contents = fs::read_to_string(path).wrap_err_with(|| format!("could not read runtime conf at {}", path.display()))?;
    serde_yaml::from_str(&contents).wrap_err_with(|| format!("runtime conf at {} is malformed", path.display()))
}
