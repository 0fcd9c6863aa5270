// imgmill/src/processors/cropper.rs
use crate::core::{CropEdge, CropSpec};
use image::{DynamicImage, GenericImageView};

#[derive(Clone, Default)]
pub struct Cropper;

impl Cropper {
    pub fn new() -> Self {
        Self
    }

    /// Removes `floor(percent/100 * dimension)` pixels from the chosen edge.
    /// The width amount applies to left/right, the height amount to
    /// top/bottom. Percentages are validated to [0, 100) before this runs,
    /// so the kept region is never empty.
    pub fn crop(&self, image: &DynamicImage, spec: CropSpec) -> DynamicImage {
        let (width, height) = image.dimensions();
        let (crop_w, crop_h) = Self::crop_amounts(width, height, spec.percent);

        if crop_w == 0 && crop_h == 0 {
            return image.clone();
        }

        log::debug!(
            "Cropping {}x{} by {}% from {} edge",
            width,
            height,
            spec.percent,
            spec.edge
        );

        match spec.edge {
            CropEdge::Top => image.crop_imm(0, crop_h, width, height - crop_h),
            CropEdge::Bottom => image.crop_imm(0, 0, width, height - crop_h),
            CropEdge::Left => image.crop_imm(crop_w, 0, width - crop_w, height),
            CropEdge::Right => image.crop_imm(0, 0, width - crop_w, height),
        }
    }

    /// Per-axis pixel counts to remove, floored.
    pub fn crop_amounts(width: u32, height: u32, percent: f32) -> (u32, u32) {
        let crop_w = (percent as f64 / 100.0 * width as f64) as u32;
        let crop_h = (percent as f64 / 100.0 * height as f64) as u32;
        (crop_w, crop_h)
    }
}
