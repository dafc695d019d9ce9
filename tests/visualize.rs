use keypoint_robustness::features::keypoint::KeyPoint;
use keypoint_robustness::image::{Image, image_encoding::ImageEncoding};
use keypoint_robustness::matching::Match;
use keypoint_robustness::visualize::{draw_keypoints, display_matches};

#[test]
fn keypoint_square_and_orientation_are_marked() {
    let image = Image::empty(32, 32, ImageEncoding::F64);
    let keypoint = KeyPoint::new(10.0, 12.0, 3.0);
    let marked = draw_keypoints(&image, &vec![keypoint]);

    // corners and edges of the square, (row, column)
    assert_eq!(marked.buffer[(9,7)], 1.0);
    assert_eq!(marked.buffer[(15,13)], 1.0);
    assert_eq!(marked.buffer[(12,7)], 1.0);
    // orientation 0 points along +x
    assert_eq!(marked.buffer[(12,10)], 1.0);
    assert_eq!(marked.buffer[(12,12)], 1.0);
    assert_eq!(marked.buffer[(11,9)], 0.0);
    assert_eq!(marked.buffer[(25,25)], 0.0);
    // the input stays untouched
    assert_eq!(image.max(), 0.0);
}

#[test]
fn keypoints_at_the_border_are_clipped() {
    let image = Image::filled(16, 16, 0.25, ImageEncoding::F64);
    let marked = draw_keypoints(&image, &vec![KeyPoint::new(0.0, 15.0, 4.0), KeyPoint::new(30.0, 30.0, 2.0)]);
    assert_eq!(marked.buffer[(11,0)], 1.0);
    assert_eq!(marked.buffer[(11,4)], 1.0);
    assert_eq!(marked.buffer[(0,0)], 0.25);
}

#[test]
fn matches_are_shown_side_by_side() {
    let image_a = Image::filled(20, 16, 0.5, ImageEncoding::F64);
    let image_b = Image::filled(24, 20, 0.25, ImageEncoding::F64);
    let keypoints_a = vec![KeyPoint::new(5.0, 5.0, 1.0)];
    let keypoints_b = vec![KeyPoint::new(20.0, 3.0, 1.0), KeyPoint::new(6.0, 8.0, 1.0)];
    let matches = vec![Match{reference_index: 0, transformed_index: 1, distance: 0.0, scale_ratio: 1.0}];

    let combined = display_matches(&image_a, &image_b, &keypoints_a, &keypoints_b, &matches);
    assert_eq!(combined.width(), 44);
    assert_eq!(combined.height(), 20);

    assert_eq!(combined.buffer[(0,0)], 0.5);
    assert_eq!(combined.buffer[(0,20)], 0.25);
    // below image a there is no content
    assert_eq!(combined.buffer[(18,0)], 0.0);

    // matched keypoints carry a square, the unmatched one does not
    assert_eq!(combined.buffer[(4,4)], 1.0);
    assert_eq!(combined.buffer[(7,25)], 1.0);
    assert_eq!(combined.buffer[(2,39)], 0.25);
    // the connecting line ends at the shifted keypoint
    assert_eq!(combined.buffer[(8,26)], 0.5);
}
