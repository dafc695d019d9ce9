use rand::{thread_rng, Rng};

use keypoint_robustness::features::keypoint::KeyPoint;
use keypoint_robustness::matching::{match_keypoints, collapse_orientations, scale_ratio, MatchParameters, Assignment};

fn kp(x: f64, y: f64, scale: f64) -> KeyPoint {
    KeyPoint::new(x, y, scale)
}

#[test]
fn identical_sets_match_completely() {
    let mut rng = thread_rng();
    let keypoints = (0..50).map(|_| kp(rng.gen_range(0.0..200.0), rng.gen_range(0.0..200.0), rng.gen_range(1.0..8.0))).collect::<Vec<KeyPoint>>();
    let report = match_keypoints(&keypoints, &keypoints, &MatchParameters{distance_tolerance: 0.0, ..MatchParameters::default()});
    assert_eq!(report.matched_count, 50);
    assert_eq!(report.match_percentage, 100.0);
    assert_eq!(report.repeatability, 100.0);
}

#[test]
fn tolerances_are_inclusive() {
    let params = MatchParameters{distance_tolerance: 2.0, scale_ratio_tolerance: 2.0, ..MatchParameters::default()};
    let reference = vec![kp(0.0, 0.0, 1.0)];
    assert_eq!(match_keypoints(&reference, &vec![kp(2.0, 0.0, 2.0)], &params).matched_count, 1);
    assert_eq!(match_keypoints(&reference, &vec![kp(2.01, 0.0, 1.0)], &params).matched_count, 0);
    assert_eq!(match_keypoints(&reference, &vec![kp(0.0, 0.0, 2.01)], &params).matched_count, 0);
}

#[test]
fn orientation_tolerance_wraps() {
    let params = MatchParameters{orientation_tolerance: Some(0.2), ..MatchParameters::default()};
    let reference = vec![KeyPoint{orientation: 6.2, ..kp(5.0, 5.0, 2.0)}];
    let close = vec![KeyPoint{orientation: 0.05, ..kp(5.0, 5.0, 2.0)}];
    let far = vec![KeyPoint{orientation: 1.0, ..kp(5.0, 5.0, 2.0)}];
    assert_eq!(match_keypoints(&reference, &close, &params).matched_count, 1);
    assert_eq!(match_keypoints(&reference, &far, &params).matched_count, 0);
}

#[test]
fn non_positive_scales_never_match() {
    assert_eq!(scale_ratio(0.0, 1.0), None);
    assert_eq!(scale_ratio(2.0, 1.0), Some(2.0));
    let report = match_keypoints(&vec![kp(1.0, 1.0, 0.0)], &vec![kp(1.0, 1.0, 0.0)], &MatchParameters::default());
    assert_eq!(report.matched_count, 0);
}

#[test]
fn one_to_one_uses_each_candidate_once() {
    let reference = vec![kp(0.0, 0.0, 1.0), kp(1.0, 0.0, 1.0)];
    let transformed = vec![kp(0.9, 0.0, 1.0)];

    let one_to_one = match_keypoints(&reference, &transformed, &MatchParameters::default());
    assert_eq!(one_to_one.matched_count, 1);
    // the closer reference keypoint wins
    assert_eq!(one_to_one.matches[0].reference_index, 1);
    assert_eq!(one_to_one.match_percentage, 50.0);
    assert_eq!(one_to_one.repeatability, 100.0);

    let nearest = match_keypoints(&reference, &transformed, &MatchParameters{assignment: Assignment::Nearest, ..MatchParameters::default()});
    assert_eq!(nearest.matched_count, 2);
    assert!(nearest.matches.iter().all(|m| m.transformed_index == 0));
    assert_eq!(nearest.match_percentage, 100.0);
    assert_eq!(nearest.repeatability, 100.0);
}

#[test]
fn ties_prefer_similar_scale_then_index() {
    let reference = vec![kp(0.0, 0.0, 2.0)];
    let transformed = vec![kp(1.0, 0.0, 2.8), kp(-1.0, 0.0, 2.2), kp(0.0, 1.0, 2.2)];
    let report = match_keypoints(&reference, &transformed, &MatchParameters::default());
    assert_eq!(report.matched_count, 1);
    assert_eq!(report.matches[0].transformed_index, 1);
}

#[test]
fn empty_sets() {
    let params = MatchParameters::default();
    let report = match_keypoints(&[], &vec![kp(1.0, 1.0, 1.0)], &params);
    assert_eq!(report.match_percentage, 0.0);
    assert_eq!(report.repeatability, 0.0);

    let report = match_keypoints(&vec![kp(1.0, 1.0, 1.0)], &[], &params);
    assert_eq!(report.matched_count, 0);
    assert_eq!(report.match_percentage, 0.0);
}

#[test]
fn invalid_parameters_are_rejected() {
    assert!(MatchParameters{distance_tolerance: -1.0, ..MatchParameters::default()}.validate().is_err());
    assert!(MatchParameters{scale_ratio_tolerance: 0.5, ..MatchParameters::default()}.validate().is_err());
    assert!(MatchParameters{orientation_tolerance: Some(-0.1), ..MatchParameters::default()}.validate().is_err());
    assert!(MatchParameters::default().validate().is_ok());
}

#[test]
fn orientations_collapse_to_strongest() {
    let at = |orientation: f64, response: f64| KeyPoint{orientation, response, ..kp(32.0, 32.0, 2.5)};
    let keypoints = vec![at(0.1, 0.2), kp(10.0, 10.0, 2.5), at(1.5, 0.7), at(3.0, 0.4), KeyPoint{scale: 5.0, ..at(0.0, 0.1)}];

    let collapsed = collapse_orientations(&keypoints);
    assert_eq!(collapsed.len(), 3);
    assert_eq!(collapsed[0].orientation, 1.5);
    assert_eq!(collapsed[0].response, 0.7);
    assert_eq!(collapsed[1].x, 10.0);
    assert_eq!(collapsed[2].scale, 5.0);
    assert!(collapse_orientations(&[]).is_empty());
}
