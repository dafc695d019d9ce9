extern crate nalgebra as na;

use na::Point2;
use serde::{Serialize, Deserialize};
use std::fmt;

use crate::Float;

/// Detected location in input image coordinates. `scale` is the gaussian sigma in input image pixels,
/// `orientation` is in radians in [0, 2π) measured with the y axis pointing down.
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct KeyPoint {
    pub x: Float,
    pub y: Float,
    pub scale: Float,
    pub orientation: Float,
    pub response: Float
}

impl KeyPoint {
    pub fn new(x: Float, y: Float, scale: Float) -> KeyPoint {
        KeyPoint{x, y, scale, orientation: 0.0, response: 0.0}
    }

    pub fn location(&self) -> Point2<Float> {
        Point2::new(self.x, self.y)
    }

    pub fn distance_to(&self, other: &KeyPoint) -> Float {
        na::distance(&self.location(), &other.location())
    }
}

impl fmt::Display for KeyPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "x: {:.2}, y: {:.2}, scale: {:.2}, orientation: {:.2}", self.x, self.y, self.scale, self.orientation)
    }
}
