use color_eyre::eyre::{Result, eyre};
use serde::{Serialize, Deserialize};

use crate::Float;
use crate::image::{Image, image_encoding::ImageEncoding, volume::Volume};
use crate::numerics::{percentile, mean_and_std};

/// How the intensity window that is mapped onto the output range is chosen
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub enum NormalizationMode {
    /// [min, max] of the data
    MinMax,
    /// [0, max], negative values are clamped to zero
    Max,
    /// mean ± clip standard deviations
    ZScore { clip: Float },
    /// robust window between two percentiles in [0,100]
    Percentile { low: Float, high: Float }
}

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub enum Quantization {
    /// Values stay in [0,1]
    Continuous,
    /// Values are rounded to the integer levels 0..levels-1
    Levels(usize)
}

impl Default for NormalizationMode {
    fn default() -> NormalizationMode {
        NormalizationMode::MinMax
    }
}

impl Default for Quantization {
    fn default() -> Quantization {
        Quantization::eight_bit()
    }
}

impl NormalizationMode {
    pub fn validate(&self) -> Result<()> {
        match *self {
            NormalizationMode::ZScore { clip } if !(clip > 0.0) => Err(eyre!("z-score clip has to be positive, got {}", clip)),
            NormalizationMode::Percentile { low, high } if !(0.0 <= low && low < high && high <= 100.0) => Err(eyre!("percentiles need 0 <= low < high <= 100, got ({},{})", low, high)),
            _ => Ok(())
        }
    }

    /// Intensity window [lower, upper] for the given data
    pub fn intensity_bounds(&self, values: &[Float]) -> Result<(Float,Float)> {
        self.validate()?;
        if values.is_empty() {
            return Err(eyre!("cannot normalize empty data"));
        }
        if values.iter().any(|v| v.is_nan()) {
            return Err(eyre!("data contains NaN values"));
        }

        let bounds = match *self {
            NormalizationMode::MinMax => {
                let min = values.iter().cloned().fold(Float::INFINITY, Float::min);
                let max = values.iter().cloned().fold(Float::NEG_INFINITY, Float::max);
                (min,max)
            },
            NormalizationMode::Max => {
                let max = values.iter().cloned().fold(Float::NEG_INFINITY, Float::max);
                (0.0, max)
            },
            NormalizationMode::ZScore { clip } => {
                let (mean, std) = mean_and_std(values);
                (mean - clip*std, mean + clip*std)
            },
            NormalizationMode::Percentile { low, high } => {
                let mut sorted = values.to_vec();
                sorted.sort_unstable_by(|a, b| a.total_cmp(b));
                (percentile(&sorted, low), percentile(&sorted, high))
            }
        };

        Ok(bounds)
    }
}

impl Quantization {
    pub fn eight_bit() -> Quantization {
        Quantization::Levels(256)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Quantization::Levels(levels) if levels < 2 => Err(eyre!("quantization needs at least two levels, got {}", levels)),
            _ => Ok(())
        }
    }

    /// Largest value the quantized output can take
    pub fn max_value(&self) -> Float {
        match *self {
            Quantization::Continuous => 1.0,
            Quantization::Levels(levels) => (levels - 1) as Float
        }
    }

    pub fn encoding(&self) -> ImageEncoding {
        match *self {
            Quantization::Continuous => ImageEncoding::F64,
            Quantization::Levels(levels) => ImageEncoding::for_levels(levels)
        }
    }

    pub fn quantize(&self, unit_value: Float) -> Float {
        match *self {
            Quantization::Continuous => unit_value,
            Quantization::Levels(_) => (unit_value*self.max_value()).round()
        }
    }

    /// Rescales a quantized image back into [0,1]
    pub fn to_unit(&self, image: &Image) -> Image {
        Image{ buffer: &image.buffer / self.max_value(), original_encoding: ImageEncoding::F64 }
    }
}

fn map_to_unit(value: Float, (lower, upper): (Float,Float)) -> Float {
    match upper - lower {
        range if range <= 0.0 => 0.0,
        range => ((value - lower)/range).clamp(0.0, 1.0)
    }
}

pub fn normalize_image(image: &Image, mode: &NormalizationMode, quantization: &Quantization) -> Result<Image> {
    quantization.validate()?;
    let bounds = mode.intensity_bounds(image.buffer.as_slice())?;
    let buffer = image.buffer.map(|v| quantization.quantize(map_to_unit(v, bounds)));
    Ok(Image{buffer, original_encoding: quantization.encoding()})
}

/// Statistics are taken over the whole volume so that all slices share one intensity window.
pub fn normalize_volume(volume: &Volume, mode: &NormalizationMode, quantization: &Quantization) -> Result<Volume> {
    quantization.validate()?;
    let values = volume.values().cloned().collect::<Vec<Float>>();
    let bounds = mode.intensity_bounds(&values)?;
    let slices = volume.slices.iter().map(|slice| Image{
        buffer: slice.buffer.map(|v| quantization.quantize(map_to_unit(v, bounds))),
        original_encoding: quantization.encoding()
    }).collect::<Vec<Image>>();
    Volume::new(slices)
}
