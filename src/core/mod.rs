// imgmill/src/core/mod.rs
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub mod pipeline;

/// Quality used by the compress stage when the user does not give one.
pub const DEFAULT_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl fmt::Display for CropEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CropEdge::Top => "top",
            CropEdge::Bottom => "bottom",
            CropEdge::Left => "left",
            CropEdge::Right => "right",
        };
        f.write_str(s)
    }
}

impl FromStr for CropEdge {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "top" => Ok(CropEdge::Top),
            "bottom" => Ok(CropEdge::Bottom),
            "left" => Ok(CropEdge::Left),
            "right" => Ok(CropEdge::Right),
            other => Err(PipelineError::InvalidConfig(format!(
                "crop edge must be one of top, bottom, left, right (got '{}')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    WebP,
}

impl OutputFormat {
    /// Canonical file extension. The "jpg" alias never appears on disk.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::WebP => image::ImageFormat::WebP,
        }
    }

    /// Whether the format can carry user-supplied textual metadata
    /// (PNG tEXt chunks). Injection is a no-op for formats without it.
    pub fn supports_text_metadata(&self) -> bool {
        matches!(self, OutputFormat::Png)
    }

    /// Whether an extracted EXIF payload can be reattached on save.
    pub fn supports_exif(&self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        // "jpg" is canonicalized to jpeg here, once, for the whole pipeline.
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::WebP),
            other => Err(PipelineError::InvalidConfig(format!(
                "unsupported output format '{}' (expected png, jpg, jpeg, or webp)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CropSpec {
    pub percent: f32,
    pub edge: CropEdge,
}

/// User-supplied replacement metadata, only applied when the original
/// metadata is being dropped.
#[derive(Debug, Clone, Default)]
pub struct ExtraMetadata {
    pub author: Option<String>,
    pub keyword: Option<String>,
    pub copyright: Option<String>,
}

impl ExtraMetadata {
    pub fn is_empty(&self) -> bool {
        self.author.is_none() && self.keyword.is_none() && self.copyright.is_none()
    }
}

/// Immutable per-run settings for one directory pass.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub directory: PathBuf,
    pub crop: Option<CropSpec>,
    pub keep_metadata: bool,
    pub format: OutputFormat,
    /// Quality for the lossy re-encode pass; `None` disables the pass.
    pub compress: Option<u8>,
    /// Resize percentage; `None` disables the pass.
    pub resize: Option<f32>,
    pub extra: Option<ExtraMetadata>,
}

impl ProcessConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.directory.exists() {
            return Err(PipelineError::InvalidConfig(format!(
                "directory does not exist: {}",
                self.directory.display()
            )));
        }

        if !self.directory.is_dir() {
            return Err(PipelineError::InvalidConfig(format!(
                "not a directory: {}",
                self.directory.display()
            )));
        }

        if let Some(crop) = &self.crop {
            if !crop.percent.is_finite() || crop.percent < 0.0 || crop.percent >= 100.0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "crop percentage must be in [0, 100), got {}",
                    crop.percent
                )));
            }
        }

        if let Some(quality) = self.compress {
            if quality == 0 || quality > 100 {
                return Err(PipelineError::InvalidConfig(format!(
                    "quality must be between 1 and 100, got {}",
                    quality
                )));
            }
        }

        if let Some(percent) = self.resize {
            if !percent.is_finite() || percent <= 0.0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "resize percentage must be greater than 0, got {}",
                    percent
                )));
            }
        }

        Ok(())
    }
}

/// Aggregated result of one directory pass.
#[derive(Debug, Default)]
pub struct RunStats {
    /// Every enumerated candidate, including files that later failed.
    pub total_files: usize,
    /// Files whose replacement reached a successful commit.
    pub committed: usize,
    /// Signed sum of (original size - final size) over committed files.
    pub space_saved: i64,
    pub errors: Vec<(PathBuf, PipelineError)>,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to decode {}: {}", .path.display(), .source)]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to save {}: {}", .path.display(), .source)]
    Save {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to compress {}: {}", .path.display(), .message)]
    Compress { path: PathBuf, message: String },

    #[error("resize to {percent}% collapses {width}x{height} to zero pixels")]
    DegenerateResize {
        width: u32,
        height: u32,
        percent: f32,
    },

    #[error("metadata error for {}: {}", .path.display(), .message)]
    Metadata { path: PathBuf, message: String },

    #[error("file not found: {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("failed to replace {}: {}", .path.display(), .source)]
    Commit {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config(dir: &std::path::Path) -> ProcessConfig {
        ProcessConfig {
            directory: dir.to_path_buf(),
            crop: None,
            keep_metadata: false,
            format: OutputFormat::Jpeg,
            compress: None,
            resize: None,
            extra: None,
        }
    }

    #[test]
    fn format_alias_jpg_is_jpeg() {
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("jpg".parse::<OutputFormat>().unwrap().extension(), "jpeg");
    }

    #[test]
    fn format_parse_rejects_unknown() {
        assert!(matches!(
            "tiff".parse::<OutputFormat>(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn text_metadata_capability_is_png_only() {
        assert!(OutputFormat::Png.supports_text_metadata());
        assert!(!OutputFormat::Jpeg.supports_text_metadata());
        assert!(!OutputFormat::WebP.supports_text_metadata());
    }

    #[test]
    fn validate_rejects_missing_directory() {
        let config = base_config(std::path::Path::new("/definitely/not/here"));
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_crop_percent_at_or_above_100() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = base_config(dir.path());
        config.crop = Some(CropSpec {
            percent: 100.0,
            edge: CropEdge::Top,
        });
        assert!(config.validate().is_err());

        config.crop = Some(CropSpec {
            percent: 99.9,
            edge: CropEdge::Top,
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_quality() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = base_config(dir.path());
        config.compress = Some(0);
        assert!(config.validate().is_err());
        config.compress = Some(101);
        assert!(config.validate().is_err());
        config.compress = Some(DEFAULT_QUALITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_nonpositive_resize() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = base_config(dir.path());
        config.resize = Some(0.0);
        assert!(config.validate().is_err());
        config.resize = Some(-5.0);
        assert!(config.validate().is_err());
        config.resize = Some(50.0);
        assert!(config.validate().is_ok());
    }
}
