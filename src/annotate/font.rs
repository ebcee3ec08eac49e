use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AppError, Result};

/// Common system font locations, checked in order.
const FONT_CANDIDATES: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Font bytes for label text.
///
/// An explicit path must be readable; without one the system locations are
/// tried and `None` means no usable font was found.
///
/// # Errors
///
/// Returns `AppError::FontLoad` when `explicit` is set but cannot be read.
pub fn load_font(explicit: Option<&Path>) -> Result<Option<Vec<u8>>> {
    if let Some(path) = explicit {
        return match read_font_file(path) {
            Some(data) => Ok(Some(data)),
            None => Err(AppError::FontLoad(format!(
                "Could not read font file: {:?}",
                path
            ))),
        };
    }

    Ok(FONT_CANDIDATES.iter().map(Path::new).find_map(read_font_file))
}

fn read_font_file(path: &Path) -> Option<Vec<u8>> {
    let mut file = File::open(path).ok()?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer).ok()?;
    Some(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_font_path_is_read() {
        let temp_dir = TempDir::new().unwrap();
        let font_path = temp_dir.path().join("label.ttf");
        fs::write(&font_path, b"not really a font").unwrap();

        let data = load_font(Some(&font_path)).unwrap().unwrap();
        assert_eq!(data, b"not really a font");
    }

    #[test]
    fn test_missing_explicit_font_path_fails() {
        let err = load_font(Some(Path::new("/nonexistent/label.ttf"))).unwrap_err();
        assert!(matches!(err, AppError::FontLoad(_)));
    }

    #[test]
    fn test_read_font_file_missing_is_none() {
        assert!(read_font_file(Path::new("/nonexistent/label.ttf")).is_none());
    }
}
