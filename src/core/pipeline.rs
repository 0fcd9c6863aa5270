// imgmill/src/core/pipeline.rs
use super::{PipelineError, ProcessConfig, Result, RunStats};
use crate::processors::{Compressor, Cropper, Loader, MetadataProcessor, Resizer};
use crate::utils::{backup_path, is_supported_input, temp_output_path};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Runs the per-file transformation sequence over every qualifying image in
/// a directory, replacing each original in place. Files are independent:
/// one failure is recorded and the scan moves on.
pub struct Pipeline {
    config: ProcessConfig,
    loader: Loader,
    cropper: Cropper,
    resizer: Resizer,
    compressor: Compressor,
    metadata: MetadataProcessor,
}

impl Pipeline {
    pub fn new(config: ProcessConfig) -> Self {
        Self {
            config,
            loader: Loader::new(),
            cropper: Cropper::new(),
            resizer: Resizer::new(),
            compressor: Compressor::new(),
            metadata: MetadataProcessor::new(),
        }
    }

    /// One full directory pass. Configuration errors abort before any file
    /// is touched; per-file errors are collected in the returned stats.
    pub fn run(&self) -> Result<RunStats> {
        self.config.validate()?;

        let files = self.collect_image_paths()?;
        let mut stats = RunStats {
            total_files: files.len(),
            ..Default::default()
        };

        if files.is_empty() {
            log::warn!(
                "No image files found in {}",
                self.config.directory.display()
            );
            return Ok(stats);
        }

        log::info!(
            "Processing {} images in {}",
            files.len(),
            self.config.directory.display()
        );

        let pb = self.create_progress_bar(files.len());
        for path in &files {
            match self.process_file(path) {
                Ok(saved) => {
                    stats.committed += 1;
                    stats.space_saved += saved;
                }
                Err(e) => {
                    log::error!("Skipping {}: {}", path.display(), e);
                    stats.errors.push((path.clone(), e));
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message(format!("{} of {} committed", stats.committed, files.len()));

        Ok(stats)
    }

    /// The fixed stage order for one file: decode, crop, extract metadata,
    /// save to a temp sibling, compress, resize, inject metadata, commit.
    /// Returns the signed byte delta (original minus final size).
    fn process_file(&self, path: &Path) -> Result<i64> {
        let original_size = fs::metadata(path)?.len();
        if let Some(format) = self.loader.detect_format(path)? {
            log::debug!("{}: {:?}, {} bytes", path.display(), format, original_size);
        }

        let mut image = self.loader.load(path)?;

        if let Some(crop) = self.config.crop {
            image = self.cropper.crop(&image, crop);
        }

        // Extracted from the original file, not the working buffer, so the
        // payload survives byte-for-byte.
        let exif = if self.config.keep_metadata {
            self.metadata.extract_raw(path)?
        } else {
            None
        };
        let exif = exif
            .as_deref()
            .filter(|_| self.config.format.supports_exif());

        let temp = temp_output_path(path, self.config.format);
        self.compressor
            .save(&image, &temp, self.config.format, exif)?;
        drop(image);

        if let Some(quality) = self.config.compress {
            self.recompress_on_disk(&temp, quality, exif)?;
        }

        if let Some(percent) = self.config.resize {
            self.resize_on_disk(&temp, percent, exif)?;
        }

        if !self.config.keep_metadata {
            if let Some(extra) = &self.config.extra {
                self.metadata.inject(&temp, self.config.format, extra)?;
            }
        }

        self.commit(path, &temp, original_size)
    }

    /// Re-opens the just-saved file and re-encodes it at the explicit
    /// quality. A separate lossy pass, intentionally distinct from the base
    /// save.
    fn recompress_on_disk(&self, temp: &Path, quality: u8, exif: Option<&[u8]>) -> Result<()> {
        let image = self
            .loader
            .load(temp)
            .map_err(|e| PipelineError::Compress {
                path: temp.to_path_buf(),
                message: e.to_string(),
            })?;
        self.compressor
            .recompress(&image, temp, self.config.format, quality, exif)
    }

    fn resize_on_disk(&self, temp: &Path, percent: f32, exif: Option<&[u8]>) -> Result<()> {
        let image = self.loader.load(temp)?;
        let resized = self.resizer.resize(&image, percent)?;
        self.compressor
            .save(&resized, temp, self.config.format, exif)
    }

    /// Replaces the original with the finished temp file. The original is
    /// parked under a backup name and only removed once the replacement has
    /// been renamed into place, so a failed rename can never lose it.
    fn commit(&self, original: &Path, temp: &Path, original_size: u64) -> Result<i64> {
        if !temp.exists() {
            return Err(PipelineError::MissingOutput(temp.to_path_buf()));
        }
        let new_size = fs::metadata(temp)?.len();

        let backup = backup_path(original);
        fs::rename(original, &backup).map_err(|source| PipelineError::Commit {
            path: original.to_path_buf(),
            source,
        })?;

        if let Err(source) = fs::rename(temp, original) {
            if let Err(restore) = fs::rename(&backup, original) {
                log::error!(
                    "Could not restore {} from {}: {}",
                    original.display(),
                    backup.display(),
                    restore
                );
            }
            return Err(PipelineError::Commit {
                path: original.to_path_buf(),
                source,
            });
        }

        if let Err(e) = fs::remove_file(&backup) {
            log::warn!("Could not remove backup {}: {}", backup.display(), e);
        }

        log::info!(
            "Replaced {} ({} -> {} bytes)",
            original.display(),
            original_size,
            new_size
        );
        Ok(original_size as i64 - new_size as i64)
    }

    /// Immediate directory entries only; matching is by lowercase extension.
    fn collect_image_paths(&self) -> Result<Vec<PathBuf>> {
        let paths = WalkDir::new(&self.config.directory)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| is_supported_input(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        Ok(paths)
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    }
}
