use crate::image::{Image,image_encoding::ImageEncoding};
use crate::filter::{gauss_kernel::GaussKernel1D, prewitt_kernel::PrewittKernel,gaussian_2_d_convolution,filter_1d_convolution};
use crate::{Float,GradientDirection};
use crate::pyramid::sift::sift_runtime_params::SiftRuntimeParams;

// Below this no blur is applied
const MIN_BLUR: Float = 1e-2;

#[derive(Debug,Clone)]
pub struct SiftOctave {
    pub images: Vec<Image>,
    pub dog_x_gradient: Vec<Image>,
    pub dog_y_gradient: Vec<Image>,
    pub dog_s_gradient: Vec<Image>,
    pub difference_of_gaussians: Vec<Image>,
    pub sigmas: Vec<Float>
}

impl SiftOctave {

    /// `base_blur` is the blur already present in `base_image`, in pixels of this octave. Image i of the octave
    /// has blur sigma_initial*2^(i/s).
    pub fn build_octave(base_image: &Image, base_blur: Float, runtime_params: &SiftRuntimeParams) -> SiftOctave {

        let s = runtime_params.sigma_count;
        let image_count = s + 3;
        let range = 0..image_count;

        let prewitt_kernel = PrewittKernel::new();

        let sigmas: Vec<Float> = range.map(|x| runtime_params.sigma_initial*SiftOctave::generate_k(x as Float, s as Float)).collect();
        let images: Vec<Image> = sigmas.iter().map(|&sigma| {
            match (sigma.powi(2) - base_blur.powi(2)).max(0.0).sqrt() {
                blur if blur < MIN_BLUR => base_image.clone(),
                blur => gaussian_2_d_convolution(base_image, &GaussKernel1D::with_blur_half_factor(blur, runtime_params.blur_half_factor))
            }
        }).collect();

        let mut difference_of_gaussians: Vec<Image> = Vec::with_capacity(image_count-1);
        for i in 0..images.len()-1 {
            let difference_buffer = &images[i+1].buffer - &images[i].buffer;
            difference_of_gaussians.push(Image::from_matrix(&difference_buffer, ImageEncoding::F64, false));
        }

        let difference_of_gaussians_borrows: Vec<&Image> = difference_of_gaussians.iter().collect();
        let dog_range = 0..difference_of_gaussians.len();

        let dog_x_gradient = dog_range.clone().map(|sigma_idx| filter_1d_convolution(&difference_of_gaussians_borrows,sigma_idx, GradientDirection::HORIZONTAL, &prewitt_kernel)).collect();
        let dog_y_gradient = dog_range.clone().map(|sigma_idx| filter_1d_convolution(&difference_of_gaussians_borrows,sigma_idx, GradientDirection::VERTICAL, &prewitt_kernel)).collect();
        let dog_s_gradient = dog_range.map(|sigma_idx| filter_1d_convolution(&difference_of_gaussians_borrows,sigma_idx, GradientDirection::SIGMA, &prewitt_kernel)).collect();
        SiftOctave {images,dog_x_gradient,dog_y_gradient,dog_s_gradient,difference_of_gaussians,sigmas}
    }

    fn generate_k(n: Float, s: Float) -> Float {
        assert!(n >= 0.0);
        let exp = n/s;
        exp.exp2()
    }

    pub fn s(&self) -> usize {
        self.sigmas.len() - 3
    }

    /// Blur at a possibly fractional dog level, in pixels of this octave
    pub fn sigma_at(&self, sigma_level: Float) -> Float {
        self.sigmas[0]*SiftOctave::generate_k(sigma_level.max(0.0), self.s() as Float)
    }

    pub fn width(&self) -> usize {
        self.images[0].buffer.ncols()
    }

    pub fn height(&self) -> usize {
        self.images[0].buffer.nrows()
    }

    /// Whether (x,y) keeps `border` pixels to the image boundary and the dog level has a neighbour on both sides
    pub fn within_range(&self, x: usize, y: usize, sigma_level: usize, border: usize) -> bool {
        let height = self.height();
        let width = self.width();
        let sigma_size = self.difference_of_gaussians.len();
        y >= border && y + border < height &&
        x >= border && x + border < width &&
        sigma_level >= 1 && sigma_level + 1 < sigma_size
    }
}
