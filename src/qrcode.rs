//! QR code rendering.
//!
//! Symbol construction is delegated to the `qrcode` crate (error correction
//! level M, smallest fitting version). This module turns the resulting module
//! matrix into a pixel-exact raster of the requested size, with a dark
//! foreground and a fixed white background.

use image::{Rgba, RgbaImage};

use crate::error::EncodeError;
use crate::helper::{parse_hex_color, to_data_uri, to_png_bytes};
use crate::range::parse_bound;

/// Light modules of the quiet zone on each side of the symbol.
pub const QUIET_ZONE: u32 = 4;

/// Background color of every rendered code.
pub const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Rendering parameters shared by every code of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrStyle {
    /// Edge length of the square output, in pixels.
    pub size: u32,
    /// Color of the dark modules.
    pub dark: Rgba<u8>,
}

impl QrStyle {
    /// Builds a style from a pixel size and a hex color.
    ///
    /// # Errors
    ///
    /// [`EncodeError::InvalidSize`] for a zero size, [`EncodeError::InvalidColor`]
    /// for a color [`parse_hex_color`] rejects.
    pub fn new(size: u32, color: &str) -> Result<Self, EncodeError> {
        if size == 0 {
            return Err(EncodeError::InvalidSize(size.to_string()));
        }
        Ok(Self { size, dark: parse_hex_color(color)? })
    }

    /// Like [`QrStyle::new`], with the size given as text (see [`parse_size`]).
    pub fn parse(size: &str, color: &str) -> Result<Self, EncodeError> {
        Self::new(parse_size(size)?, color)
    }
}

/// Parses a pixel size with the same leading-integer rule as range bounds.
///
/// `"200"`, `" 200 "` and `"200px"` all give 200. The result must be a
/// positive value that fits in a `u32`.
///
/// # Example
///
/// ```
/// use qrbatch::qrcode::parse_size;
///
/// assert_eq!(parse_size("200px").unwrap(), 200);
/// assert!(parse_size("px200").is_err());
/// ```
pub fn parse_size(size: &str) -> Result<u32, EncodeError> {
    parse_bound(size)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| n > 0)
        .ok_or_else(|| EncodeError::InvalidSize(size.to_string()))
}

/// Encodes `text` into a `size × size` raster.
///
/// Every output pixel takes the color of the module it falls on, scaled by
/// nearest neighbour, so the image is exactly the requested size whatever the
/// symbol version. Identical inputs always give identical pixels.
///
/// # Arguments
///
/// * `text` - The payload to encode.
/// * `style` - Size and foreground color.
///
/// # Errors
///
/// [`EncodeError::Data`] if the text exceeds QR capacity,
/// [`EncodeError::SizeTooSmall`] if there are fewer pixels than modules.
///
/// # Example
///
/// ```
/// use qrbatch::qrcode::{encode_raster, QrStyle};
///
/// let style = QrStyle::new(200, "#000000").unwrap();
/// let img = encode_raster("ABC/1", &style).unwrap();
/// assert_eq!(img.dimensions(), (200, 200));
/// ```
pub fn encode_raster(text: &str, style: &QrStyle) -> Result<RgbaImage, EncodeError> {
    let code = ::qrcode::QrCode::new(text.as_bytes())?;
    let width = code.width() as u32;
    let total = width + 2 * QUIET_ZONE;
    if style.size < total {
        return Err(EncodeError::SizeTooSmall { size: style.size, required: total });
    }
    let colors = code.to_colors();
    let size = u64::from(style.size);

    let module_at = |px: u32| -> Option<u32> {
        let m = (u64::from(px) * u64::from(total) / size) as u32;
        m.checked_sub(QUIET_ZONE).filter(|&q| q < width)
    };

    let is_dark = |qx: u32, qy: u32| colors[(qy * width + qx) as usize] == ::qrcode::Color::Dark;
    let img = RgbaImage::from_fn(style.size, style.size, |x, y| match (module_at(x), module_at(y)) {
        (Some(qx), Some(qy)) if is_dark(qx, qy) => style.dark,
        _ => LIGHT,
    });
    Ok(img)
}

/// Encodes `text` straight to PNG bytes.
pub fn encode_png(text: &str, style: &QrStyle) -> Result<Vec<u8>, EncodeError> {
    to_png_bytes(&encode_raster(text, style)?)
}

/// Encodes `text` to a `data:image/png;base64,...` URI.
pub fn encode_data_uri(text: &str, style: &QrStyle) -> Result<String, EncodeError> {
    Ok(to_data_uri(&encode_png(text, style)?))
}
