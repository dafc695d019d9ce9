mod common;

use keypoint_robustness::{Float, float};
use keypoint_robustness::features::{Detector, keypoint::KeyPoint, sift_feature::SiftFeatureDetector, reference_sift::ReferenceSiftDetector};
use keypoint_robustness::features::reference_sift::{octave_count, build_scale_space, reference_sift_params::ReferenceSiftParams};
use keypoint_robustness::image::{Image, image_encoding::ImageEncoding};
use keypoint_robustness::matching::{match_keypoints, MatchParameters};
use keypoint_robustness::pyramid::sift::{build_sift_pyramid, sift_runtime_params::SiftRuntimeParams};
use keypoint_robustness::rotation::{rotate_image, rotate_keypoints_back, image_center, Interpolation, Extent};

const BLOB_SIGMA: Float = 2.8;

fn blob_image() -> Image {
    common::gaussian_blob_image(64, 64, &[(32.0, 32.0, BLOB_SIGMA, 1.0)])
}

fn detectors() -> (SiftFeatureDetector, ReferenceSiftDetector) {
    (SiftFeatureDetector::default(), ReferenceSiftDetector::default())
}

fn closest_to(keypoints: &Vec<KeyPoint>, x: Float, y: Float) -> Option<KeyPoint> {
    let target = KeyPoint::new(x, y, 1.0);
    keypoints.iter().cloned().min_by(|a, b| a.distance_to(&target).total_cmp(&b.distance_to(&target)))
}

fn assert_finds_blob(detector: &dyn Detector) {
    let keypoints = detector.detect(&blob_image());
    let closest = closest_to(&keypoints, 32.0, 32.0).expect("no keypoint found");
    assert!(closest.distance_to(&KeyPoint::new(32.0, 32.0, 1.0)) < 1.5, "{}: {}", detector.name(), closest);
    assert!(closest.scale > 0.5*BLOB_SIGMA && closest.scale < 2.0*BLOB_SIGMA, "{}: {}", detector.name(), closest);
    assert!(closest.orientation >= 0.0 && closest.orientation < 2.0*float::consts::PI);
}

#[test]
fn sift_feature_finds_blob() {
    assert_finds_blob(&detectors().0);
}

#[test]
fn reference_sift_finds_blob() {
    assert_finds_blob(&detectors().1);
}

#[test]
fn flat_image_has_no_keypoints() {
    let image = Image::filled(48, 48, 0.5, ImageEncoding::F64);
    let (sift_feature, reference_sift) = detectors();
    assert!(sift_feature.detect(&image).is_empty());
    assert!(reference_sift.detect(&image).is_empty());
}

#[test]
fn features_limit_keeps_strongest() {
    let image = common::gaussian_blob_image(96, 96, &[(30.0, 30.0, BLOB_SIGMA, 1.0), (66.0, 66.0, BLOB_SIGMA, 0.5)]);
    let mut detector = SiftFeatureDetector::default();
    let all = detector.detect(&image);
    assert!(all.len() >= 2);

    detector.runtime_params.features_limit = Some(1);
    let limited = detector.detect(&image);
    assert_eq!(limited.len(), 1);
    let strongest = all.iter().map(|k| k.response).fold(0.0, Float::max);
    assert_eq!(limited[0].response, strongest);
}

#[test]
fn pyramid_stops_at_small_octaves() {
    let params = SiftRuntimeParams{octave_count: 10, ..SiftRuntimeParams::default()};
    let pyramid = build_sift_pyramid(&blob_image(), &params);
    // 128, 64, 32, 16 pixels; the next one would be smaller than the border allows
    assert_eq!(pyramid.octaves.len(), 4);
    assert_eq!(pyramid.octaves[0].width(), 128);
    for octave in pyramid.octaves.iter() {
        assert_eq!(octave.images.len(), params.sigma_count + 3);
        assert_eq!(octave.difference_of_gaussians.len(), params.sigma_count + 2);
    }
}

#[test]
fn quarter_turn_detections_match() {
    let image = blob_image();
    let center = image_center(&image);
    let (sift_feature, reference_sift) = detectors();
    let detectors: Vec<&dyn Detector> = vec![&sift_feature, &reference_sift];

    for detector in detectors {
        let reference = detector.detect(&image);
        assert!(!reference.is_empty());

        let rotated = rotate_image(&image, float::consts::FRAC_PI_2, &center, Interpolation::Nearest, Extent::Crop, 0.0);
        let back = rotate_keypoints_back(&detector.detect(&rotated.image), &rotated.transform);
        let report = match_keypoints(&reference, &back, &MatchParameters::default());
        assert!(report.match_percentage >= 50.0, "{}: {:?}", detector.name(), report);
    }
}

#[test]
fn reference_octaves_keep_twelve_pixels() {
    let params = ReferenceSiftParams::default();
    assert_eq!(octave_count(64, 64, &params), 4);
    assert_eq!(octave_count(512, 384, &params), 7);
    assert_eq!(octave_count(5, 5, &params), 0);
    assert_eq!(octave_count(512, 384, &ReferenceSiftParams{max_octaves: Some(2), ..ReferenceSiftParams::default()}), 2);

    let octaves = build_scale_space(&blob_image(), &params);
    assert_eq!(octaves.len(), 4);
    assert_eq!(octaves[3].images[0].width(), 16);
    assert_eq!(octaves[3].pixel_distance, 4.0);
}
