//! Logo compositing.
//!
//! A logo is scaled to a fifth of the QR image width, keeping its aspect
//! ratio, and blended source-over at the center of the code.

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageReader, RgbaImage};
use std::path::{Path, PathBuf};

use crate::error::{QrBatchError, Result};

/// Logo width is the base image width divided by this.
pub const LOGO_WIDTH_DIVISOR: u32 = 5;

/// A decoded logo, ready to be scaled for a given code size.
#[derive(Debug, Clone)]
pub struct Logo {
    image: RgbaImage,
    source: Option<PathBuf>,
}

impl Logo {
    /// Reads and decodes a logo file.
    ///
    /// The format is sniffed from the content, so scratch uploads without an
    /// extension are fine.
    ///
    /// # Errors
    ///
    /// [`QrBatchError::LogoRead`] if the file is missing or not an image.
    /// There is no fallback to "no logo".
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let logo_err = |source: ImageError| QrBatchError::LogoRead { path: path.to_path_buf(), source };

        let image = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| logo_err(ImageError::IoError(e)))?
            .decode()
            .map_err(logo_err)?;
        Ok(Self { image: image.to_rgba8(), source: Some(path.to_path_buf()) })
    }

    /// Wraps an already decoded image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self { image: image.to_rgba8(), source: None }
    }

    /// Path the logo was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Original logo dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Scales the logo for a base image `base_width` pixels wide.
    ///
    /// # Errors
    ///
    /// [`QrBatchError::LogoTooSmall`] when the base is too narrow to hold a
    /// logo at all. The logo is never silently left out.
    pub fn scaled_for(&self, base_width: u32) -> Result<RgbaImage> {
        let (width, height) = scaled_dimensions(self.dimensions(), base_width)
            .ok_or(QrBatchError::LogoTooSmall { base_width })?;
        Ok(imageops::resize(&self.image, width, height, FilterType::Triangle))
    }
}

/// Target size of a `logo` placed on a base `base_width` pixels wide.
///
/// Width is `floor(base_width / 5)`; height follows the logo's aspect ratio,
/// rounded, and is at least one pixel.
pub fn scaled_dimensions(logo: (u32, u32), base_width: u32) -> Option<(u32, u32)> {
    let (logo_w, logo_h) = logo;
    let width = base_width / LOGO_WIDTH_DIVISOR;
    if width == 0 || logo_w == 0 || logo_h == 0 {
        return None;
    }
    let height = (f64::from(logo_h) * f64::from(width) / f64::from(logo_w)).round().max(1.0);
    Some((width, height as u32))
}

/// Top-left offset that centers `top` on `base`; floored, and may be negative.
pub fn centered_offset(base: (u32, u32), top: (u32, u32)) -> (i64, i64) {
    let x = (i64::from(base.0) - i64::from(top.0)).div_euclid(2);
    let y = (i64::from(base.1) - i64::from(top.1)).div_euclid(2);
    (x, y)
}

/// Blends an already scaled logo onto the center of `base`, in place.
///
/// Logo pixels falling outside `base` are clipped; the canvas never changes
/// size.
pub fn overlay_centered(base: &mut RgbaImage, scaled: &RgbaImage) {
    let (x, y) = centered_offset(base.dimensions(), scaled.dimensions());
    imageops::overlay(base, scaled, x, y);
}

/// Scales `logo` for `base` and composites it at the center.
///
/// # Errors
///
/// [`QrBatchError::LogoTooSmall`] if `base` is narrower than
/// [`LOGO_WIDTH_DIVISOR`] pixels.
///
/// # Example
///
/// ```
/// use image::{DynamicImage, Rgba, RgbaImage};
/// use qrbatch::logo::{composite_logo, Logo};
///
/// let base = RgbaImage::from_pixel(200, 200, Rgba([255, 255, 255, 255]));
/// let logo = Logo::from_image(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
///     10, 10, Rgba([0, 0, 255, 255]),
/// )));
/// let merged = composite_logo(base, &logo)?;
/// assert_eq!(merged.dimensions(), (200, 200));
/// assert!(merged.get_pixel(100, 100).0[2] > 250);
/// # Ok::<(), qrbatch::QrBatchError>(())
/// ```
pub fn composite_logo(mut base: RgbaImage, logo: &Logo) -> Result<RgbaImage> {
    let scaled = logo.scaled_for(base.width())?;
    overlay_centered(&mut base, &scaled);
    Ok(base)
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Write;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn near(p: &Rgba<u8>, q: Rgba<u8>) -> bool {
        p.0.iter().zip(q.0).all(|(a, b)| a.abs_diff(b) <= 2)
    }

    fn solid_logo(w: u32, h: u32, px: Rgba<u8>) -> Logo {
        Logo::from_image(DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, px)))
    }

    #[test]
    fn test_scaled_width_is_a_fifth() {
        assert_eq!(scaled_dimensions((100, 50), 200), Some((40, 20)));
        assert_eq!(scaled_dimensions((100, 50), 203), Some((40, 20)));
        assert_eq!(scaled_dimensions((30, 90), 150), Some((30, 90)));
        assert_eq!(scaled_dimensions((1000, 1), 100), Some((20, 1)));
        assert_eq!(scaled_dimensions((10, 10), 4), None);
    }

    #[test]
    fn test_scaled_for_matches_dimensions() {
        let logo = solid_logo(64, 32, BLUE);
        let scaled = logo.scaled_for(250).unwrap();
        assert_eq!(scaled.dimensions(), (50, 25));
    }

    #[test]
    fn test_centered_offset() {
        assert_eq!(centered_offset((200, 200), (40, 20)), (80, 90));
        assert_eq!(centered_offset((201, 201), (40, 40)), (80, 80));
        assert_eq!(centered_offset((10, 10), (20, 13)), (-5, -2));
    }

    #[test]
    fn test_composite_keeps_canvas() {
        let base = RgbaImage::from_pixel(200, 200, WHITE);
        let merged = composite_logo(base, &solid_logo(10, 30, BLUE)).unwrap();
        assert_eq!(merged.dimensions(), (200, 200));
        // 40x120 logo at (80, 40).
        assert!(near(merged.get_pixel(80, 40), BLUE));
        assert!(near(merged.get_pixel(119, 159), BLUE));
        assert_eq!(*merged.get_pixel(79, 100), WHITE);
        assert_eq!(*merged.get_pixel(120, 100), WHITE);
        assert_eq!(*merged.get_pixel(100, 39), WHITE);
    }

    #[test]
    fn test_transparent_logo_leaves_base() {
        let base = RgbaImage::from_pixel(100, 100, WHITE);
        let merged = composite_logo(base.clone(), &solid_logo(8, 8, Rgba([0, 0, 0, 0]))).unwrap();
        assert_eq!(merged, base);
    }

    #[test]
    fn test_narrow_base_fails_instead_of_skipping() {
        let base = RgbaImage::from_pixel(4, 4, WHITE);
        let err = composite_logo(base, &solid_logo(8, 8, BLUE)).unwrap_err();
        assert!(matches!(err, QrBatchError::LogoTooSmall { base_width: 4 }));

        let err = solid_logo(8, 8, BLUE).scaled_for(0).unwrap_err();
        assert!(matches!(err, QrBatchError::LogoTooSmall { base_width: 0 }));

        // Five pixels is the narrowest base that still takes a logo.
        let merged = composite_logo(RgbaImage::from_pixel(5, 5, WHITE), &solid_logo(8, 8, BLUE)).unwrap();
        assert!(near(merged.get_pixel(2, 2), BLUE));
    }

    #[test]
    fn test_oversized_logo_is_clipped() {
        let mut base = RgbaImage::from_pixel(10, 10, WHITE);
        overlay_centered(&mut base, &RgbaImage::from_pixel(30, 30, BLUE));
        assert_eq!(base.dimensions(), (10, 10));
        assert!(base.pixels().all(|p| *p == BLUE));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Logo::open(dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, QrBatchError::LogoRead { .. }));
    }

    #[test]
    fn test_open_non_image() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a picture").unwrap();
        let err = Logo::open(file.path()).unwrap_err();
        assert!(matches!(err, QrBatchError::LogoRead { .. }));
    }

    #[test]
    fn test_open_png_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload");
        let png = crate::helper::to_png_bytes(&RgbaImage::from_pixel(6, 3, BLUE)).unwrap();
        std::fs::write(&path, png).unwrap();

        let logo = Logo::open(&path).unwrap();
        assert_eq!(logo.dimensions(), (6, 3));
        assert_eq!(logo.source(), Some(path.as_path()));
    }
}
