extern crate nalgebra as na;

use na::Vector2;

use crate::Float;
use crate::image::Image;
use crate::features::keypoint::KeyPoint;
use crate::matching::Match;
use crate::numerics::rotation_matrix_2d_from_orientation;

pub mod plot;

/// Axis aligned square outline of half side `side_length`. Parts outside the image are skipped.
pub fn draw_square(image: &mut Image, x: isize, y: isize, side_length: isize, value: Float) -> () {
    for i in x-side_length..x+side_length+1 {
        set_pixel(image, i, y + side_length, value);
        set_pixel(image, i, y - side_length, value);
    }

    for j in y-side_length+1..y+side_length {
        set_pixel(image, x + side_length, j, value);
        set_pixel(image, x - side_length, j, value);
    }
}

pub fn draw_line(image: &mut Image, start: (Float,Float), end: (Float,Float), value: Float) -> () {
    let length = ((end.0 - start.0).powi(2) + (end.1 - start.1).powi(2)).sqrt();
    let samples = (length.ceil() as usize).max(1);
    for i in 0..samples+1 {
        let t = i as Float/samples as Float;
        let x = start.0 + t*(end.0 - start.0);
        let y = start.1 + t*(end.1 - start.1);
        set_pixel(image, x.round() as isize, y.round() as isize, value);
    }
}

fn set_pixel(image: &mut Image, x: isize, y: isize, value: Float) -> () {
    if x >= 0 && y >= 0 && (x as usize) < image.width() && (y as usize) < image.height() {
        image.buffer[(y as usize, x as usize)] = value;
    }
}

/// Square scaled by the keypoint scale and a line in the direction of the keypoint orientation
pub fn draw_keypoint(image: &mut Image, keypoint: &KeyPoint, value: Float) -> () {
    let radius = (keypoint.scale.max(1.0)).round() as isize;
    let x = keypoint.x.round() as isize;
    let y = keypoint.y.round() as isize;
    draw_square(image, x, y, radius, value);

    let direction = rotation_matrix_2d_from_orientation(keypoint.orientation)*Vector2::new(radius as Float, 0.0);
    draw_line(image, (keypoint.x, keypoint.y), (keypoint.x + direction[0], keypoint.y + direction[1]), value);
}

/// Copy of `image` with all keypoints marked at the maximum intensity of the image
pub fn draw_keypoints(image: &Image, keypoints: &Vec<KeyPoint>) -> Image {
    let mut target = image.clone();
    let value = image.max().max(1.0);
    for keypoint in keypoints {
        draw_keypoint(&mut target, keypoint, value);
    }
    target
}

/// Both images side by side with matched keypoints marked and connected
pub fn display_matches(image_a: &Image, image_b: &Image, keypoints_a: &Vec<KeyPoint>, keypoints_b: &Vec<KeyPoint>, matches: &Vec<Match>) -> Image {

    let height = image_a.height().max(image_b.height());
    let width = image_a.width() + image_b.width();
    let offset = image_a.width() as Float;

    let mut target_image = Image::empty(width, height, image_a.original_encoding);

    for x in 0..image_a.width() {
        for y in 0..image_a.height() {
            target_image.buffer[(y,x)] = image_a.buffer[(y,x)];
        }
    }
    for x in 0..image_b.width() {
        for y in 0..image_b.height() {
            target_image.buffer[(y,x+image_a.width())] = image_b.buffer[(y,x)];
        }
    }

    let value = image_a.max().max(image_b.max()).max(1.0);

    for m in matches {
        let keypoint_a = &keypoints_a[m.reference_index];
        let keypoint_b = &keypoints_b[m.transformed_index];
        let shifted_b = KeyPoint{x: keypoint_b.x + offset, ..*keypoint_b};

        draw_keypoint(&mut target_image, keypoint_a, value);
        draw_keypoint(&mut target_image, &shifted_b, value);
        draw_line(&mut target_image, (keypoint_a.x, keypoint_a.y), (shifted_b.x, shifted_b.y), 0.5*value);
    }

    target_image
}
