// imgmill/src/processors/metadata.rs
use crate::core::{ExtraMetadata, OutputFormat, PipelineError, Result};
use exif::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
// APP1 segment length field covers itself plus the "Exif\0\0" identifier.
const EXIF_HEADER_LEN: usize = 8;

#[derive(Clone, Default)]
pub struct MetadataProcessor;

impl MetadataProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Reads the raw EXIF payload (the TIFF block) from a JPEG, PNG, or WebP
    /// container. A file without EXIF is `Ok(None)`, not an error.
    pub fn extract_raw(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(&file);

        match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => {
                log::debug!("Found EXIF data in {}", path.display());
                Ok(Some(exif.buf().to_vec()))
            }
            Err(exif::Error::NotFound(_)) => {
                log::debug!("No EXIF data found in {}", path.display());
                Ok(None)
            }
            Err(e) => Err(PipelineError::Metadata {
                path: path.to_path_buf(),
                message: format!("EXIF read error: {}", e),
            }),
        }
    }

    pub fn has_metadata(&self, path: &Path) -> Result<bool> {
        Ok(self.extract_raw(path)?.is_some())
    }

    /// Splices a raw EXIF payload into an encoded JPEG as an APP1 segment
    /// directly after SOI. The payload is carried byte-for-byte. Returns the
    /// input unchanged when the payload cannot be attached (oversized for a
    /// single segment, or the buffer is not a JPEG).
    pub fn attach_jpeg_exif(&self, jpeg: &[u8], raw: &[u8]) -> Vec<u8> {
        if jpeg.len() < 2 || jpeg[..2] != JPEG_SOI {
            log::warn!("EXIF reattachment skipped: buffer is not a JPEG");
            return jpeg.to_vec();
        }

        let segment_len = raw.len() + EXIF_HEADER_LEN;
        if segment_len > u16::MAX as usize {
            log::warn!(
                "EXIF reattachment skipped: {} byte payload exceeds APP1 capacity",
                raw.len()
            );
            return jpeg.to_vec();
        }

        let mut out = Vec::with_capacity(jpeg.len() + segment_len + 2);
        out.extend_from_slice(&JPEG_SOI);
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&(segment_len as u16).to_be_bytes());
        out.extend_from_slice(b"Exif\0\0");
        out.extend_from_slice(raw);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    /// Attaches user-supplied textual metadata to the saved file, when the
    /// target format supports it. For formats without textual metadata this
    /// is a logged no-op.
    pub fn inject(&self, path: &Path, format: OutputFormat, extra: &ExtraMetadata) -> Result<()> {
        if !format.supports_text_metadata() {
            log::debug!(
                "Text metadata not supported for {} output, skipping {}",
                format.extension(),
                path.display()
            );
            return Ok(());
        }

        let mut entries: Vec<(&str, &str)> = Vec::new();
        if let Some(author) = extra.author.as_deref().filter(|s| !s.is_empty()) {
            entries.push(("Author", author));
        }
        if let Some(keyword) = extra.keyword.as_deref().filter(|s| !s.is_empty()) {
            entries.push(("Keyword", keyword));
        }
        if let Some(copyright) = extra.copyright.as_deref().filter(|s| !s.is_empty()) {
            entries.push(("Copyright", copyright));
        }
        if entries.is_empty() {
            return Ok(());
        }

        let data = std::fs::read(path)?;
        let updated = self
            .insert_png_text_chunks(&data, &entries)
            .map_err(|message| PipelineError::Metadata {
                path: path.to_path_buf(),
                message,
            })?;
        std::fs::write(path, updated)?;

        log::debug!(
            "Injected {} text chunk(s) into {}",
            entries.len(),
            path.display()
        );
        Ok(())
    }

    /// Inserts tEXt chunks immediately after IHDR. IHDR is mandatory, first,
    /// and fixed-size, so the insertion point is a constant offset.
    fn insert_png_text_chunks(
        &self,
        png: &[u8],
        entries: &[(&str, &str)],
    ) -> std::result::Result<Vec<u8>, String> {
        // signature + IHDR length/type/13 data bytes/CRC
        const IHDR_END: usize = 8 + 4 + 4 + 13 + 4;

        if png.len() < IHDR_END || png[..8] != PNG_SIGNATURE {
            return Err("not a PNG file".to_string());
        }
        if &png[12..16] != b"IHDR" {
            return Err("PNG is missing its IHDR chunk".to_string());
        }

        let mut out = Vec::with_capacity(png.len() + entries.len() * 32);
        out.extend_from_slice(&png[..IHDR_END]);
        for (keyword, text) in entries {
            Self::write_text_chunk(&mut out, keyword, text);
        }
        out.extend_from_slice(&png[IHDR_END..]);
        Ok(out)
    }

    fn write_text_chunk(out: &mut Vec<u8>, keyword: &str, text: &str) {
        let mut chunk = Vec::with_capacity(4 + keyword.len() + 1 + text.len());
        chunk.extend_from_slice(b"tEXt");
        chunk.extend_from_slice(keyword.as_bytes());
        chunk.push(0);
        chunk.extend_from_slice(text.as_bytes());

        let data_len = (chunk.len() - 4) as u32;
        out.extend_from_slice(&data_len.to_be_bytes());
        out.extend_from_slice(&chunk);
        out.extend_from_slice(&crc32fast::hash(&chunk).to_be_bytes());
    }
}
