// imgmill/src/processors/resizer.rs
use crate::core::{PipelineError, Result};
use image::{imageops::FilterType, DynamicImage, GenericImageView};

pub struct Resizer {
    filter: FilterType,
}

impl Resizer {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Scales both axes by `percent`, flooring each new dimension. A
    /// dimension that floors to zero is a per-file error, not a panic.
    pub fn resize(&self, image: &DynamicImage, percent: f32) -> Result<DynamicImage> {
        let (width, height) = image.dimensions();
        let (new_width, new_height) = Self::scaled_dimensions(width, height, percent);

        if new_width == 0 || new_height == 0 {
            return Err(PipelineError::DegenerateResize {
                width,
                height,
                percent,
            });
        }

        if new_width == width && new_height == height {
            log::debug!("Image dimensions unchanged, skipping resize");
            return Ok(image.clone());
        }

        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            width,
            height,
            new_width,
            new_height
        );

        Ok(image.resize_exact(new_width, new_height, self.filter))
    }

    /// `floor(dim * percent / 100)` for each axis independently.
    pub fn scaled_dimensions(width: u32, height: u32, percent: f32) -> (u32, u32) {
        let new_width = (width as f64 * percent as f64 / 100.0) as u32;
        let new_height = (height as f64 * percent as f64 / 100.0) as u32;
        (new_width, new_height)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_dimensions_floor() {
        assert_eq!(Resizer::scaled_dimensions(200, 100, 50.0), (100, 50));
        assert_eq!(Resizer::scaled_dimensions(99, 99, 50.0), (49, 49));
        assert_eq!(Resizer::scaled_dimensions(3, 3, 150.0), (4, 4));
    }

    #[test]
    fn resize_halves_image() {
        let img = DynamicImage::new_rgb8(200, 100);
        let resized = Resizer::new().resize(&img, 50.0).unwrap();
        assert_eq!(resized.dimensions(), (100, 50));
    }

    #[test]
    fn resize_can_upscale() {
        let img = DynamicImage::new_rgb8(10, 10);
        let resized = Resizer::new().resize(&img, 200.0).unwrap();
        assert_eq!(resized.dimensions(), (20, 20));
    }

    #[test]
    fn resize_rejects_collapse_to_zero() {
        let img = DynamicImage::new_rgb8(10, 10);
        let result = Resizer::new().resize(&img, 5.0);
        assert!(matches!(
            result,
            Err(PipelineError::DegenerateResize { .. })
        ));
    }

    #[test]
    fn resize_at_100_percent_is_identity() {
        let img = DynamicImage::new_rgb8(17, 31);
        let resized = Resizer::new().resize(&img, 100.0).unwrap();
        assert_eq!(resized.dimensions(), (17, 31));
    }
}
