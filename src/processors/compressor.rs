// imgmill/src/processors/compressor.rs
use crate::core::{OutputFormat, PipelineError, Result};
use crate::processors::MetadataProcessor;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageResult};
use oxipng::{optimize_from_memory, Options};
use std::fs;
use std::io::Cursor;
use std::path::Path;

pub struct Compressor {
    metadata: MetadataProcessor,
}

impl Compressor {
    pub fn new() -> Self {
        Self {
            metadata: MetadataProcessor::new(),
        }
    }

    /// Base save at encoder defaults. When the target is JPEG and a raw EXIF
    /// payload is given, it is spliced back in as an APP1 segment.
    pub fn save(
        &self,
        image: &DynamicImage,
        path: &Path,
        format: OutputFormat,
        exif: Option<&[u8]>,
    ) -> Result<()> {
        log::debug!(
            "Saving image to {} as {}",
            path.display(),
            format.extension()
        );

        let bytes = self
            .encode(image, format, None)
            .map_err(|source| PipelineError::Save {
                path: path.to_path_buf(),
                source,
            })?;
        let bytes = self.reattach_exif(bytes, format, exif);

        fs::write(path, bytes)?;
        self.log_save_result(path)
    }

    /// Lossy re-encode pass with an explicit quality factor. Distinct from
    /// `save`: PNG goes through oxipng, JPEG is re-encoded at `quality`.
    /// WebP is re-encoded lossless since the image crate has no lossy WebP
    /// encoder; quality does not apply there.
    pub fn recompress(
        &self,
        image: &DynamicImage,
        path: &Path,
        format: OutputFormat,
        quality: u8,
        exif: Option<&[u8]>,
    ) -> Result<()> {
        let quality = quality.clamp(1, 100);
        log::debug!(
            "Recompressing {} as {} at quality {}",
            path.display(),
            format.extension(),
            quality
        );

        let bytes = match format {
            OutputFormat::Png => {
                let encoded = self.encode(image, format, None).map_err(|source| {
                    PipelineError::Compress {
                        path: path.to_path_buf(),
                        message: source.to_string(),
                    }
                })?;
                optimize_from_memory(&encoded, &Options::default()).map_err(|e| {
                    PipelineError::Compress {
                        path: path.to_path_buf(),
                        message: format!("PNG optimization failed: {}", e),
                    }
                })?
            }
            OutputFormat::Jpeg | OutputFormat::WebP => self
                .encode(image, format, Some(quality))
                .map_err(|source| PipelineError::Compress {
                    path: path.to_path_buf(),
                    message: source.to_string(),
                })?,
        };
        let bytes = self.reattach_exif(bytes, format, exif);

        fs::write(path, bytes)?;
        self.log_save_result(path)
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        quality: Option<u8>,
    ) -> ImageResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());

        match format {
            OutputFormat::Png => {
                image.write_to(&mut buffer, image::ImageFormat::Png)?;
            }
            OutputFormat::Jpeg => {
                // The JPEG encoder takes 8-bit grayscale or RGB only; alpha
                // and 16-bit inputs must be flattened first.
                let flattened = match image {
                    DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => None,
                    _ => Some(DynamicImage::ImageRgb8(image.to_rgb8())),
                };
                let image = flattened.as_ref().unwrap_or(image);

                let encoder = match quality {
                    Some(q) => JpegEncoder::new_with_quality(&mut buffer, q),
                    None => JpegEncoder::new(&mut buffer),
                };
                image.write_with_encoder(encoder)?;
            }
            OutputFormat::WebP => {
                let converted = match image {
                    DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => None,
                    _ => Some(DynamicImage::ImageRgba8(image.to_rgba8())),
                };
                let image = converted.as_ref().unwrap_or(image);
                image.write_with_encoder(WebPEncoder::new_lossless(&mut buffer))?;
            }
        }

        Ok(buffer.into_inner())
    }

    fn reattach_exif(&self, bytes: Vec<u8>, format: OutputFormat, exif: Option<&[u8]>) -> Vec<u8> {
        match exif {
            Some(raw) if format.supports_exif() => self.metadata.attach_jpeg_exif(&bytes, raw),
            _ => bytes,
        }
    }

    fn log_save_result(&self, path: &Path) -> Result<()> {
        let file_size = fs::metadata(path)?.len();
        log::debug!("Saved image: {} ({} bytes)", path.display(), file_size);
        Ok(())
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn save_round_trips_dimensions_per_format() {
        let dir = tempfile::tempdir().unwrap();
        let img = DynamicImage::new_rgb8(40, 30);
        let compressor = Compressor::new();

        for format in [OutputFormat::Png, OutputFormat::Jpeg, OutputFormat::WebP] {
            let path = dir.path().join(format!("out.{}", format.extension()));
            compressor.save(&img, &path, format, None).unwrap();
            let reopened = image::open(&path).unwrap();
            assert_eq!(reopened.dimensions(), (40, 30));
        }
    }

    #[test]
    fn jpeg_save_flattens_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let img = DynamicImage::new_rgba8(16, 16);
        let path = dir.path().join("alpha.jpeg");

        Compressor::new()
            .save(&img, &path, OutputFormat::Jpeg, None)
            .unwrap();
        let reopened = image::open(&path).unwrap();
        assert_eq!(reopened.dimensions(), (16, 16));
    }

    #[test]
    fn recompress_low_quality_shrinks_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let compressor = Compressor::new();

        // Noise compresses poorly at high quality, so the gap is measurable.
        let mut rgb = image::RgbImage::new(128, 128);
        for (x, y, pixel) in rgb.enumerate_pixels_mut() {
            *pixel = image::Rgb([
                (x * 31 % 255) as u8,
                (y * 57 % 255) as u8,
                ((x + y) * 83 % 255) as u8,
            ]);
        }
        let img = DynamicImage::ImageRgb8(rgb);

        let high = dir.path().join("high.jpeg");
        let low = dir.path().join("low.jpeg");
        compressor
            .recompress(&img, &high, OutputFormat::Jpeg, 95, None)
            .unwrap();
        compressor
            .recompress(&img, &low, OutputFormat::Jpeg, 10, None)
            .unwrap();

        let high_size = fs::metadata(&high).unwrap().len();
        let low_size = fs::metadata(&low).unwrap().len();
        assert!(low_size < high_size);
    }

    #[test]
    fn recompressed_png_still_decodes() {
        let dir = tempfile::tempdir().unwrap();
        let img = DynamicImage::new_rgb8(32, 32);
        let path = dir.path().join("out.png");

        Compressor::new()
            .recompress(&img, &path, OutputFormat::Png, 85, None)
            .unwrap();
        let reopened = image::open(&path).unwrap();
        assert_eq!(reopened.dimensions(), (32, 32));
    }
}
