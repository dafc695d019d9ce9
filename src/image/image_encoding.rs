use serde::{Serialize, Deserialize};
use crate::Float;

#[repr(u8)]
#[derive(Debug,Copy,Clone,PartialEq,Serialize,Deserialize)]
pub enum ImageEncoding {
    U8,
    U16,
    S16,
    F64
}

impl ImageEncoding {
    // https://en.wikipedia.org/wiki/Normalization_(image_processing)
    pub fn normalize_to_gray(&self, max: Float, min : Float, value: Float) -> u8 {
        let range = 255 as Float; // 255 - 0
        match max - min {
            diff if diff <= 0.0 => 0,
            diff => ((value - min) * (range / diff)).round().clamp(0.0, range) as u8
        }
    }

    /// Encoding that can hold `levels` distinct non-negative integer values.
    pub fn for_levels(levels: usize) -> ImageEncoding {
        match levels {
            l if l <= 256 => ImageEncoding::U8,
            l if l <= 65536 => ImageEncoding::U16,
            _ => ImageEncoding::F64
        }
    }
}
