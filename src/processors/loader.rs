// imgmill/src/processors/loader.rs
use crate::core::{PipelineError, Result};
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::path::Path;

#[derive(Clone, Default)]
pub struct Loader;

impl Loader {
    pub fn new() -> Self {
        Self
    }

    /// Decodes an image from disk. The underlying file handle is consumed by
    /// the decode and released before this returns, so the caller is free to
    /// delete or rename the file afterwards.
    pub fn load(&self, path: &Path) -> Result<DynamicImage> {
        log::debug!("Loading image from: {}", path.display());

        self.validate_path(path)?;

        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|source| PipelineError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        let (width, height) = image.dimensions();
        log::debug!("Loaded {}: {}x{} pixels", path.display(), width, height);

        Ok(image)
    }

    /// Detects the on-disk format from file content, without decoding pixels.
    pub fn detect_format(&self, path: &Path) -> Result<Option<ImageFormat>> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        Ok(reader.format())
    }

    fn validate_path(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(PipelineError::MissingOutput(path.to_path_buf()));
        }

        let metadata = path.metadata()?;
        if metadata.len() == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "file is empty: {}",
                path.display()
            )));
        }

        Ok(())
    }
}
