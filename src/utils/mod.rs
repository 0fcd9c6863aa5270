// imgmill/src/utils/mod.rs
use crate::core::OutputFormat;
use std::path::{Path, PathBuf};

/// Input extensions the directory scan accepts, matched case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Working file written next to the original: `_<stem>.<canonical ext>`.
/// It is renamed over the original at commit and must not outlive a
/// successful run.
pub fn temp_output_path(original: &Path, format: OutputFormat) -> PathBuf {
    let stem = original
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    original.with_file_name(format!("_{}.{}", stem, format.extension()))
}

/// Sidecar name the original is parked under while the replacement is
/// renamed into place.
pub fn backup_path(original: &Path) -> PathBuf {
    let name = original
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    original.with_file_name(format!("{}.bak", name))
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    // Saturate at the largest unit instead of indexing past the table.
    let exponent =
        ((bytes_f64.log10() / base.log10()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

/// Signed variant for the end-of-run space delta, which is negative when
/// outputs grew.
pub fn format_space_delta(delta: i64) -> String {
    if delta < 0 {
        format!("-{}", format_file_size(delta.unsigned_abs()))
    } else {
        format_file_size(delta as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_inputs_match_case_insensitively() {
        assert!(is_supported_input(Path::new("a.png")));
        assert!(is_supported_input(Path::new("b.JPG")));
        assert!(is_supported_input(Path::new("c.Jpeg")));
        assert!(is_supported_input(Path::new("d.webp")));
        assert!(!is_supported_input(Path::new("e.gif")));
        assert!(!is_supported_input(Path::new("noext")));
    }

    #[test]
    fn temp_path_prefixes_stem_and_uses_canonical_extension() {
        let temp = temp_output_path(Path::new("/photos/cat.jpg"), OutputFormat::Jpeg);
        assert_eq!(temp, PathBuf::from("/photos/_cat.jpeg"));

        let temp = temp_output_path(Path::new("/photos/cat.jpg"), OutputFormat::WebP);
        assert_eq!(temp, PathBuf::from("/photos/_cat.webp"));
    }

    #[test]
    fn backup_path_stays_in_directory() {
        let backup = backup_path(Path::new("/photos/cat.jpg"));
        assert_eq!(backup, PathBuf::from("/photos/cat.jpg.bak"));
    }

    #[test]
    fn file_sizes_format_with_units() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512.00 B");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn file_sizes_saturate_at_largest_unit() {
        // Past the table's last entry, stay in PB rather than panicking.
        assert!(format_file_size(u64::MAX).ends_with(" PB"));
    }

    #[test]
    fn space_delta_keeps_sign() {
        assert_eq!(format_space_delta(2048), "2.00 KB");
        assert_eq!(format_space_delta(-2048), "-2.00 KB");
        assert_eq!(format_space_delta(0), "0 B");
    }
}
