use color_eyre::eyre::{Result, eyre};
use serde::{Serialize, Deserialize};
use std::{cmp::Ordering, collections::HashMap};

use crate::Float;
use crate::features::keypoint::KeyPoint;
use crate::numerics::angular_difference;

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum Assignment {
    /// Greedy assignment over all admissible pairs in order of increasing distance. Every keypoint is used at most once.
    OneToOne,
    /// Every reference keypoint takes its nearest admissible candidate. Candidates may be reused.
    Nearest
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct MatchParameters {
    /// Maximum euclidean distance in pixels
    pub distance_tolerance: Float,
    /// Maximum of max(s_a,s_b)/min(s_a,s_b)
    pub scale_ratio_tolerance: Float,
    /// Maximum orientation difference in radians, ignored when None
    pub orientation_tolerance: Option<Float>,
    pub assignment: Assignment
}

impl Default for MatchParameters {
    fn default() -> MatchParameters {
        MatchParameters {
            distance_tolerance: 3.0,
            scale_ratio_tolerance: 1.5,
            orientation_tolerance: None,
            assignment: Assignment::OneToOne
        }
    }
}

impl MatchParameters {
    pub fn validate(&self) -> Result<()> {
        if !(self.distance_tolerance >= 0.0) {
            return Err(eyre!("distance tolerance has to be non negative, got {}", self.distance_tolerance));
        }
        if !(self.scale_ratio_tolerance >= 1.0) {
            return Err(eyre!("scale ratio tolerance has to be at least 1, got {}", self.scale_ratio_tolerance));
        }
        match self.orientation_tolerance {
            Some(tolerance) if !(tolerance >= 0.0) => Err(eyre!("orientation tolerance has to be non negative, got {}", tolerance)),
            _ => Ok(())
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Match {
    pub reference_index: usize,
    pub transformed_index: usize,
    pub distance: Float,
    pub scale_ratio: Float
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct MatchReport {
    pub matches: Vec<Match>,
    pub reference_count: usize,
    pub transformed_count: usize,
    pub matched_count: usize,
    /// matched / reference * 100
    pub match_percentage: Float,
    /// matched / min(reference, transformed) * 100
    pub repeatability: Float
}

/// max/min of two scales, None if one of them is not positive
pub fn scale_ratio(a: Float, b: Float) -> Option<Float> {
    match a > 0.0 && b > 0.0 {
        true => Some(a.max(b)/a.min(b)),
        false => None
    }
}

fn admissible(reference: &KeyPoint, transformed: &KeyPoint, params: &MatchParameters) -> Option<(Float,Float)> {
    let distance = reference.distance_to(transformed);
    if distance > params.distance_tolerance {
        return None;
    }
    let ratio = scale_ratio(reference.scale, transformed.scale)?;
    if ratio > params.scale_ratio_tolerance {
        return None;
    }
    if let Some(tolerance) = params.orientation_tolerance {
        if angular_difference(reference.orientation, transformed.orientation) > tolerance {
            return None;
        }
    }
    Some((distance, ratio))
}

/// Orders by distance, then by how far the scale ratio is from one, then by indices
fn compare_matches(a: &Match, b: &Match) -> Ordering {
    a.distance.total_cmp(&b.distance)
        .then(a.scale_ratio.ln().total_cmp(&b.scale_ratio.ln()))
        .then(a.reference_index.cmp(&b.reference_index))
        .then(a.transformed_index.cmp(&b.transformed_index))
}

/// All admissible pairs. The transformed set is sorted by x so only a window of width 2*distance_tolerance is scanned.
pub fn candidate_pairs(reference: &[KeyPoint], transformed: &[KeyPoint], params: &MatchParameters) -> Vec<Match> {
    let mut by_x = (0..transformed.len()).collect::<Vec<usize>>();
    by_x.sort_by(|&a, &b| transformed[a].x.total_cmp(&transformed[b].x));

    let mut pairs = Vec::<Match>::new();
    for (reference_index, reference_keypoint) in reference.iter().enumerate() {
        let lower = reference_keypoint.x - params.distance_tolerance;
        let upper = reference_keypoint.x + params.distance_tolerance;
        let start = by_x.partition_point(|&i| transformed[i].x < lower);
        for &transformed_index in by_x[start..].iter().take_while(|&&i| transformed[i].x <= upper) {
            if let Some((distance, scale_ratio)) = admissible(reference_keypoint, &transformed[transformed_index], params) {
                pairs.push(Match{reference_index, transformed_index, distance, scale_ratio});
            }
        }
    }
    pairs
}

/// Keypoints that share (x, y, scale) and differ only in orientation collapse into the one with the largest
/// response. The order of first occurrence is kept.
pub fn collapse_orientations(keypoints: &[KeyPoint]) -> Vec<KeyPoint> {
    let mut index_by_location = HashMap::<(u64,u64,u64), usize>::with_capacity(keypoints.len());
    let mut collapsed = Vec::<KeyPoint>::with_capacity(keypoints.len());
    for keypoint in keypoints {
        let key = (keypoint.x.to_bits(), keypoint.y.to_bits(), keypoint.scale.to_bits());
        match index_by_location.get(&key) {
            Some(&idx) => {
                if keypoint.response > collapsed[idx].response {
                    collapsed[idx] = *keypoint;
                }
            },
            None => {
                index_by_location.insert(key, collapsed.len());
                collapsed.push(*keypoint);
            }
        }
    }
    collapsed
}

/// Matches `reference` keypoints against `transformed` keypoints that are already expressed in the reference frame
pub fn match_keypoints(reference: &[KeyPoint], transformed: &[KeyPoint], params: &MatchParameters) -> MatchReport {
    let mut pairs = candidate_pairs(reference, transformed, params);
    pairs.sort_by(compare_matches);

    let mut reference_used = vec![false; reference.len()];
    let mut transformed_used = vec![false; transformed.len()];
    let mut matches = Vec::<Match>::new();

    for pair in pairs {
        if reference_used[pair.reference_index] {
            continue;
        }
        match params.assignment {
            Assignment::OneToOne => {
                if transformed_used[pair.transformed_index] {
                    continue;
                }
                transformed_used[pair.transformed_index] = true;
            },
            Assignment::Nearest => ()
        };
        reference_used[pair.reference_index] = true;
        matches.push(pair);
    }

    matches.sort_by_key(|m| m.reference_index);

    let matched_count = matches.len();
    let match_percentage = percentage(matched_count, reference.len());
    // Nearest may reuse candidates, so this can exceed the smaller set
    let repeatability = percentage(matched_count, reference.len().min(transformed.len())).min(100.0);

    MatchReport {
        matches,
        reference_count: reference.len(),
        transformed_count: transformed.len(),
        matched_count,
        match_percentage,
        repeatability
    }
}

fn percentage(count: usize, total: usize) -> Float {
    match total {
        0 => 0.0,
        _ => 100.0*(count as Float)/(total as Float)
    }
}
