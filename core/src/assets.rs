//! Test asset lookup and image decoding
//!
//! Assets are looked up by bare file name in a list of search directories,
//! then next to the executable, then in the working directory.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors while loading an image asset
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("image not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decoded RGBA8 pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows, top to bottom
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Make every pixel matching the top-left pixel's RGB fully transparent.
    pub fn apply_color_key(&mut self) {
        if self.pixels.len() < 4 {
            return;
        }
        let key = [self.pixels[0], self.pixels[1], self.pixels[2]];
        for pixel in self.pixels.chunks_exact_mut(4) {
            if pixel[..3] == key {
                pixel[3] = 0;
            }
        }
    }
}

/// Resolve an asset file name to a path.
///
/// Returns the first existing candidate, or `name` unchanged when none exist
/// so the caller's error names what was asked for.
pub fn resource_path(name: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    search_dirs
        .iter()
        .cloned()
        .chain(exe_dir)
        .map(|dir| dir.join(name))
        .chain(std::iter::once(PathBuf::from(name)))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(name))
}

/// Decode an image file (BMP or PNG) into RGBA8.
///
/// With `transparent`, the top-left pixel's color is used as a color key.
pub fn load_image(path: &Path, transparent: bool) -> Result<ImageData, TextureError> {
    if !path.is_file() {
        return Err(TextureError::NotFound(path.to_path_buf()));
    }

    let img = image::open(path).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut data = ImageData {
        width,
        height,
        pixels: rgba.into_raw(),
    };

    if transparent {
        data.apply_color_key();
    }

    tracing::debug!("Loaded image {}: {}x{}", path.display(), width, height);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_bmp(dir: &Path, name: &str) -> PathBuf {
        let img = image::RgbaImage::from_fn(4, 2, |x, _y| {
            if x == 0 {
                image::Rgba([255, 0, 0, 255]) // Red
            } else {
                image::Rgba([0, 255, 0, 255]) // Green
            }
        });
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_load_bmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_bmp(dir.path(), "sample.bmp");

        let data = load_image(&path, false).unwrap();
        assert_eq!(data.width, 4);
        assert_eq!(data.height, 2);
        assert_eq!(data.pixels.len(), 4 * 2 * 4);
        assert_eq!(&data.pixels[0..4], &[255, 0, 0, 255]);
        assert_eq!(&data.pixels[4..8], &[0, 255, 0, 255]);
    }

    #[test]
    fn test_load_with_color_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_bmp(dir.path(), "keyed.bmp");

        let data = load_image(&path, true).unwrap();
        // Column 0 matches the top-left pixel
        assert_eq!(data.pixels[3], 0);
        assert_eq!(data.pixels[7], 255);
    }

    #[test]
    fn test_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_image(&dir.path().join("missing.bmp"), false);
        assert!(matches!(result, Err(TextureError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.bmp");
        std::fs::write(&path, b"not a bitmap").unwrap();
        let result = load_image(&path, false);
        assert!(matches!(result, Err(TextureError::Decode { .. })));
    }

    #[test]
    fn test_resource_path_prefers_search_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let expected = write_test_bmp(dir.path(), "found.bmp");
        let resolved = resource_path("found.bmp", &[dir.path().to_path_buf()]);
        assert_eq!(resolved, expected);
    }

    #[test]
    fn test_resource_path_falls_back_to_name() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resource_path("no-such-asset.bmp", &[dir.path().to_path_buf()]);
        assert_eq!(resolved, PathBuf::from("no-such-asset.bmp"));
    }
}
