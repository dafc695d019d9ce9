extern crate image as image_rs;
extern crate nalgebra as na;

use image_rs::{GrayImage,ImageBuffer, DynamicImage,Pixel, Luma};
use image_rs::flat::NormalForm;
use na::DMatrix;

use crate::Float;
use self::image_encoding::ImageEncoding;

pub mod image_encoding;
pub mod volume;

// Sample positions this close to the border are still considered inside
const BORDER_TOLERANCE: Float = 1e-9;

/// Gray scale image. The buffer is indexed (row, column) i.e. (y, x).
#[derive(Debug,Clone,PartialEq)]
pub struct Image {
    pub buffer: DMatrix<Float>,
    pub original_encoding: ImageEncoding
}

impl Image {

    pub fn size(&self) -> usize {
        self.buffer.ncols()*self.buffer.nrows()
    }

    pub fn width(&self) -> usize {
        self.buffer.ncols()
    }

    pub fn height(&self) -> usize {
        self.buffer.nrows()
    }

    pub fn empty(width: usize, height: usize, image_encoding: ImageEncoding) -> Image {
        Image::filled(width, height, 0.0, image_encoding)
    }

    pub fn filled(width: usize, height: usize, value: Float, image_encoding: ImageEncoding) -> Image {
        let buffer = DMatrix::<Float>::from_element(height,width,value);
        Image{ buffer, original_encoding: image_encoding}
    }

    pub fn from_matrix(matrix: &DMatrix<Float>, original_encoding: ImageEncoding, normalize: bool) -> Image {
        let mut buffer = matrix.clone();

        if normalize {
            let max = buffer.amax();
            if max > 0.0 {
                buffer /= max;
            }
        }

        Image{ buffer, original_encoding}
    }

    pub fn from_gray_image(image: &GrayImage , normalize: bool, invert_y : bool) -> Image {
        let buffer = Image::image8_to_matrix(image, invert_y);
        Image::from_matrix(&buffer, ImageEncoding::U8, normalize)
    }

    pub fn from_gray16_image(image: &ImageBuffer<Luma<u16>, Vec<u16>>, normalize: bool, invert_y : bool) -> Image {
        let buffer = Image::image16_to_matrix(image, invert_y);
        Image::from_matrix(&buffer, ImageEncoding::U16, normalize)
    }

    pub fn to_image(&self) -> GrayImage {
        Image::matrix_to_image(&self.buffer,  self.original_encoding)
    }

    pub fn min(&self) -> Float {
        self.buffer.min()
    }

    pub fn max(&self) -> Float {
        self.buffer.max()
    }

    pub fn is_inside(&self, x: Float, y: Float) -> bool {
        x >= -BORDER_TOLERANCE && y >= -BORDER_TOLERANCE &&
        x <= (self.width() - 1) as Float + BORDER_TOLERANCE &&
        y <= (self.height() - 1) as Float + BORDER_TOLERANCE
    }

    pub fn sample_nearest(&self, x: Float, y: Float) -> Option<Float> {
        let x_round = x.round();
        let y_round = y.round();
        match x_round >= 0.0 && y_round >= 0.0 && x_round < self.width() as Float && y_round < self.height() as Float {
            true => Some(self.buffer[(y_round as usize, x_round as usize)]),
            false => None
        }
    }

    pub fn sample_bilinear(&self, x: Float, y: Float) -> Option<Float> {
        if !self.is_inside(x, y) {
            return None;
        }

        let x_max = (self.width() - 1) as Float;
        let y_max = (self.height() - 1) as Float;
        let x_clamped = x.clamp(0.0, x_max);
        let y_clamped = y.clamp(0.0, y_max);

        let x_0 = x_clamped.floor() as usize;
        let y_0 = y_clamped.floor() as usize;
        let x_1 = (x_0 + 1).min(self.width() - 1);
        let y_1 = (y_0 + 1).min(self.height() - 1);
        let a = x_clamped - x_0 as Float;
        let b = y_clamped - y_0 as Float;

        Some((1.0-a)*(1.0-b)*self.buffer[(y_0,x_0)] +
             a*(1.0-b)*self.buffer[(y_0,x_1)] +
             (1.0-a)*b*self.buffer[(y_1,x_0)] +
             a*b*self.buffer[(y_1,x_1)])
    }

    pub fn downsample_half(image: &Image, (r_min,c_min): (usize,usize)) -> Option<Image> {
        let width = image.buffer.ncols();
        let height = image.buffer.nrows();

        let new_width = width/2;
        let new_height = height/2;

        if new_height < r_min || new_width < c_min  {
            return None;
        }

        let mut new_buffer = DMatrix::<Float>::from_element(new_height,new_width,0.0);
        for x in 0..new_width {
            for y in 0..new_height {
                new_buffer[(y,x)] = image.buffer[(2*y,2*x)];
            }
        }

        Some(Image{
            buffer: new_buffer,
            original_encoding: image.original_encoding
        })
    }

    /// Bilinear upsampling where new pixel (x,y) samples the old image at (x/2,y/2).
    pub fn upsample_double(image: &Image) -> Image {
        let width = image.buffer.ncols();
        let height = image.buffer.nrows();

        let new_width = width*2;
        let new_height = height*2;

        let old_buffer = &image.buffer;
        let mut new_buffer = DMatrix::<Float>::zeros(new_height,new_width);

        for x in 0..new_width {
            for y in 0..new_height {
                let x_prime = x as Float / 2.0;
                let y_prime = y as Float / 2.0;
                let x_0 = (x_prime.trunc() as usize).min(width-1);
                let y_0 = (y_prime.trunc() as usize).min(height-1);
                let x_1 = (x_0 + 1).min(width-1);
                let y_1 = (y_0 + 1).min(height-1);
                let a = x_prime - x_prime.trunc();
                let b = y_prime - y_prime.trunc();

                new_buffer[(y,x)] = a*b*old_buffer[(y_1, x_1)] +
                                    (1.0-a)*b*old_buffer[(y_1, x_0)] +
                                    a*(1.0-b)*old_buffer[(y_0, x_1)] +
                                    (1.0-a)*(1.0-b)*old_buffer[(y_0, x_0)];
            }
        }
        Image{
            buffer: new_buffer,
            original_encoding: image.original_encoding
        }

    }

    fn image8_to_matrix(gray_image: &GrayImage, invert_y: bool) -> DMatrix<Float> {
        debug_assert!(gray_image.sample_layout().is_normal(NormalForm::RowMajorPacked));

        let (width, height) = gray_image.dimensions();
        let size = (width * height) as usize;
        let mut vec_column_major: Vec<Float> = Vec::with_capacity(size);
        for x in 0..width {
            for y in 0..height {
                let pixel = match invert_y {
                    true =>  gray_image.get_pixel(x, height - 1 - y),
                    false => gray_image.get_pixel(x, y)
                };
                let pixel_value = pixel.channels()[0];
                vec_column_major.push(pixel_value as Float);
            }
        }
        DMatrix::<Float>::from_vec(height as usize, width as usize, vec_column_major)
    }

    fn image16_to_matrix(gray_image: &ImageBuffer<Luma<u16>, Vec<u16>>, invert_y: bool) -> DMatrix<Float> {
        debug_assert!(gray_image.sample_layout().is_normal(NormalForm::RowMajorPacked));

        let (width, height) = gray_image.dimensions();
        let size = (width * height) as usize;
        let mut vec_column_major: Vec<Float> = Vec::with_capacity(size);
        for x in 0..width {
            for y in 0..height {
                let pixel = match invert_y {
                    true =>  gray_image.get_pixel(x, height - 1 - y),
                    false => gray_image.get_pixel(x, y)
                };
                let pixel_value = pixel.channels()[0];
                vec_column_major.push(pixel_value as Float);
            }
        }
        DMatrix::<Float>::from_vec(height as usize, width as usize, vec_column_major)
    }

    fn matrix_to_image(matrix: &DMatrix<Float>,  encoding: ImageEncoding) -> GrayImage {
        let (rows, cols) = matrix.shape();

        let mut gray_image = DynamicImage::new_luma8(cols as u32, rows as u32).to_luma8();
        let max = matrix.max();
        let min = matrix.min();
        for c in 0..cols {
            for r in 0..rows {
                let val = *matrix.index((r, c));
                let pixel_value =  encoding.normalize_to_gray(max,min,val);
                gray_image.put_pixel(c as u32, r as u32, Luma([pixel_value]));
            }
        }
        gray_image
    }

}
